//! TMDB (The Movie Database) catalog client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use marquee_core::catalog::{CatalogItem, Credits, Details, Genre, Page, WatchProviders};
use marquee_core::types::{ContentType, Section, TimeWindow};
use tracing::debug;

use crate::provider::CatalogSource;
use crate::{MetadataError, Result, normalize};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    /// Provider credential. Requests fail with [`MetadataError::Config`] while unset.
    pub api_key: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: TmdbConfig) -> Self {
        Self { config, client }
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                MetadataError::Config(
                    "TMDB API key is not configured; set MARQUEE_TMDB_API_KEY".into(),
                )
            })
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<serde_json::Value> {
        let api_key = self.api_key()?;

        let mut all_params: Vec<(&str, &str)> = vec![("api_key", api_key)];
        all_params.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        debug!(endpoint = %path, "TMDB request");

        let resp = self.client.get(&url).query(&all_params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MetadataError::Upstream {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        resp.json()
            .await
            .map_err(|e| MetadataError::Decode(format!("{path}: {e}")))
    }

    async fn list(
        &self,
        content_type: ContentType,
        path: &str,
        mut params: Vec<(&str, String)>,
        page: u32,
    ) -> Result<Page<CatalogItem>> {
        params.push(("page", page.max(1).to_string()));
        let data = self.get_json(path, &params).await?;
        Ok(normalize::page(content_type, &data))
    }
}

/// Upstream path for a browse section.
pub fn section_path(section: Section, window: TimeWindow) -> String {
    match section {
        Section::MovieNowPlaying => "/movie/now_playing".into(),
        Section::MovieUpcoming => "/movie/upcoming".into(),
        Section::MovieTopRated | Section::TvTopRated => {
            format!("/{}/top_rated", section.content_type())
        }
        Section::MoviePopular | Section::TvPopular => {
            format!("/{}/popular", section.content_type())
        }
        Section::MovieTrending | Section::TvTrending => {
            format!("/trending/{}/{}", section.content_type(), window.as_str())
        }
    }
}

#[async_trait::async_trait]
impl CatalogSource for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn section(
        &self,
        section: Section,
        window: TimeWindow,
        page: u32,
    ) -> Result<Page<CatalogItem>> {
        let path = section_path(section, window);
        self.list(section.content_type(), &path, vec![], page).await
    }

    async fn search(
        &self,
        content_type: ContentType,
        query: &str,
        page: u32,
    ) -> Result<Page<CatalogItem>> {
        let path = format!("/search/{content_type}");
        self.list(content_type, &path, vec![("query", query.to_string())], page)
            .await
    }

    async fn details(&self, content_type: ContentType, id: u64) -> Result<Details> {
        let path = format!("/{content_type}/{id}");
        let data = self.get_json(&path, &[]).await?;
        normalize::details(content_type, &data)
            .ok_or_else(|| MetadataError::Decode(format!("{path}: record has no id")))
    }

    async fn credits(&self, content_type: ContentType, id: u64) -> Result<Credits> {
        let data = self
            .get_json(&format!("/{content_type}/{id}/credits"), &[])
            .await?;
        Ok(normalize::credits(&data))
    }

    async fn watch_providers(
        &self,
        content_type: ContentType,
        id: u64,
    ) -> Result<WatchProviders> {
        let data = self
            .get_json(&format!("/{content_type}/{id}/watch/providers"), &[])
            .await?;
        Ok(normalize::watch_providers(&data))
    }

    async fn genres(&self, content_type: ContentType) -> Result<Vec<Genre>> {
        let data = self
            .get_json(&format!("/genre/{content_type}/list"), &[])
            .await?;
        Ok(normalize::genres(&data))
    }
}
