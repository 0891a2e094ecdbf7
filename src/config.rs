use anyhow::bail;
use std::env;
use std::path::PathBuf;

use crate::validate::MAX_FILE_SIZE;

pub const DEFAULT_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Process-wide settings, read once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub upload_root: PathBuf,
    pub port: u16,
    pub body_limit: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("UPLOAD_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let Some(api_key) = api_key else {
            bail!("UPLOAD_API_KEY must be set to a non-empty value; refusing to start");
        };

        let upload_root = env::var("UPLOAD_ROOT")
            .unwrap_or_else(|_| "uploads".to_string())
            .into();

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let body_limit = env::var("BODY_LIMIT")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_BODY_LIMIT);
        if body_limit <= MAX_FILE_SIZE {
            bail!(
                "BODY_LIMIT ({} bytes) must exceed the {} byte file size ceiling",
                body_limit,
                MAX_FILE_SIZE
            );
        }

        Ok(Self {
            api_key,
            upload_root,
            port,
            body_limit,
        })
    }
}
