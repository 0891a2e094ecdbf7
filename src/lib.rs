pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod state;
pub mod storage;
pub mod validate;
