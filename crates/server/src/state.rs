use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use marquee_metadata::images::ImageUrls;
use marquee_metadata::provider::CatalogSource;
use sha2::{Digest, Sha512};
use sqlx::SqlitePool;

use crate::admin::AdminCredentials;
use crate::artwork::{ARTWORK_PREFIX, ArtworkLatch};
use crate::config::AppConfig;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub catalog: Arc<dyn CatalogSource>,
    /// Artwork URLs handed to clients; they go through the proxy.
    pub images: ImageUrls,
    /// Upstream CDN the proxy fetches from.
    pub cdn: ImageUrls,
    pub admin: AdminCredentials,
    pub identity_secret: Option<String>,
    pub provider_regions: Arc<[String]>,
    pub search_debounce: Duration,
    pub cookie_key: Key,
    /// Client for the artwork proxy.
    pub http: reqwest::Client,
    pub artwork: ArtworkLatch,
}

impl AppState {
    pub fn new(config: &AppConfig, db: SqlitePool, catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            db,
            catalog,
            images: ImageUrls::proxied(ARTWORK_PREFIX),
            cdn: ImageUrls::new(config.image_base_url.clone()),
            admin: AdminCredentials::new(
                &config.admin_username,
                &config.admin_password,
                config.secure_cookies(),
            ),
            identity_secret: config.identity_secret.clone(),
            provider_regions: config.provider_regions.clone().into(),
            search_debounce: config.search_debounce,
            cookie_key: cookie_key(config.cookie_secret.as_deref()),
            http: reqwest::Client::new(),
            artwork: ArtworkLatch::default(),
        }
    }
}

/// Derive the signing key from a configured secret, or generate one.
fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => Key::generate(),
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
