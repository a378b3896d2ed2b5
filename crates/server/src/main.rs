use std::sync::Arc;

use anyhow::Context;
use marquee_metadata::tmdb::TmdbClient;
use marquee_server::config::{AppConfig, LogFormat};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    info!(db_path = %config.db_path, "connecting to database");
    let pool = marquee_db::connect(&config.db_path)
        .await
        .context("failed to connect to database")?;

    marquee_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    if config.tmdb.api_key.is_none() {
        warn!("MARQUEE_TMDB_API_KEY is not set; catalog requests will fail with 503");
    }
    if config.identity_secret.is_none() {
        warn!("MARQUEE_IDENTITY_SECRET is not set; watchlist routes will reject every request");
    }
    if config.cookie_secret.is_none() {
        warn!("MARQUEE_COOKIE_SECRET is not set; admin sessions will not survive a restart");
    }

    let catalog = Arc::new(TmdbClient::new(config.tmdb.clone()));
    let app_state = marquee_server::state::AppState::new(&config, pool, catalog);
    let app = marquee_server::routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
