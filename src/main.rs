use anyhow::Context;
use log::info;
use upload_server::app::build_router;
use upload_server::config::Config;
use upload_server::state::AppState;
use upload_server::storage::init_upload_root;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    info!("Starting upload server...");

    let config = Config::from_env()?;
    init_upload_root(&config.upload_root).context("Failed to initialize upload root")?;

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config);
    let app = build_router(state);

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind address")?;

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
