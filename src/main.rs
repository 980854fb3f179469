use anyhow::Context;

use shortcuts_api::config;
use shortcuts_api::server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, SHORTCUTS_DATA_DIR, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Shortcuts API in {:?} mode", config.environment);

    tokio::fs::create_dir_all(&config.storage.data_dir)
        .await
        .with_context(|| format!("failed to create data dir {}", config.storage.data_dir.display()))?;

    let state = AppState::new(&config.storage.data_dir)?;
    state
        .users
        .seed_defaults()
        .await
        .context("failed to seed default users")?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Shortcuts API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}
