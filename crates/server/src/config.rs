//! Environment-driven configuration.

use std::time::Duration;

use marquee_metadata::images::DEFAULT_IMAGE_BASE;
use marquee_metadata::search::DEFAULT_DEBOUNCE;
use marquee_metadata::tmdb::{DEFAULT_BASE_URL, TmdbConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tmdb: TmdbConfig,
    pub image_base_url: String,
    pub admin_username: String,
    pub admin_password: String,
    pub environment: Environment,
    /// Key material for signed cookies; a random key is used when unset.
    pub cookie_secret: Option<String>,
    /// HS256 secret shared with the identity provider.
    pub identity_secret: Option<String>,
    /// Watch-provider regions in order of preference.
    pub provider_regions: Vec<String>,
    /// Quiet period before live search queries the catalog.
    pub search_debounce: Duration,
    pub db_path: String,
    pub bind_addr: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| non_empty(lookup(key));

        let environment = match var("MARQUEE_ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let log_format = match var("MARQUEE_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let provider_regions = var("MARQUEE_PROVIDER_REGIONS")
            .map(|v| {
                v.split(',')
                    .map(|r| r.trim().to_ascii_uppercase())
                    .filter(|r| !r.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|regions| !regions.is_empty())
            .unwrap_or_else(|| vec!["IN".to_string(), "US".to_string()]);

        let search_debounce = var("MARQUEE_SEARCH_DEBOUNCE_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE);

        Self {
            tmdb: TmdbConfig {
                base_url: var("MARQUEE_TMDB_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                api_key: var("MARQUEE_TMDB_API_KEY"),
            },
            image_base_url: var("MARQUEE_TMDB_IMAGE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_IMAGE_BASE.to_string()),
            admin_username: var("MARQUEE_ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: var("MARQUEE_ADMIN_PASSWORD")
                .unwrap_or_else(|| "admin123".to_string()),
            environment,
            cookie_secret: var("MARQUEE_COOKIE_SECRET"),
            identity_secret: var("MARQUEE_IDENTITY_SECRET"),
            provider_regions,
            search_debounce,
            db_path: var("MARQUEE_DB").unwrap_or_else(|| "marquee.db".to_string()),
            bind_addr: var("MARQUEE_BIND").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            log_format,
        }
    }

    /// Cookies carry the `Secure` attribute only in production.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }
}
