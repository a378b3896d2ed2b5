//! Artwork proxy with a process-wide failure latch.
//!
//! Once an image URL fails to load it is remembered and served as the
//! placeholder glyph from then on; the latch never resets while the process
//! runs. Only well-formed TMDB file names reach the upstream, and the latch
//! holds at most [`MAX_LATCHED`] URLs.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use marquee_core::error::ApiError;
use marquee_metadata::images::{AssetKind, ImageSize, is_artwork_file};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

pub const PLACEHOLDER_SVG: &str = include_str!("../static/placeholder-poster.svg");

/// Route prefix the artwork proxy is mounted under.
pub const ARTWORK_PREFIX: &str = "/artwork";

/// Upper bound on latched URLs.
pub const MAX_LATCHED: usize = 4096;

#[derive(Debug, Clone)]
pub struct ArtworkLatch {
    failed: Arc<Mutex<HashSet<String>>>,
    capacity: usize,
}

impl Default for ArtworkLatch {
    fn default() -> Self {
        Self::with_capacity(MAX_LATCHED)
    }
}

impl ArtworkLatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            failed: Arc::default(),
            capacity,
        }
    }

    pub async fn has_failed(&self, url: &str) -> bool {
        self.failed.lock().await.contains(url)
    }

    /// Latch a URL. Returns `true` the first time it is marked; a full latch
    /// accepts nothing new and the URL is retried on its next request.
    pub async fn mark_failed(&self, url: &str) -> bool {
        let mut failed = self.failed.lock().await;
        if failed.len() >= self.capacity && !failed.contains(url) {
            debug!(url = %url, capacity = self.capacity, "artwork latch full");
            return false;
        }
        failed.insert(url.to_string())
    }

    pub async fn len(&self) -> usize {
        self.failed.lock().await.len()
    }
}

pub async fn placeholder() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        PLACEHOLDER_SVG,
    )
        .into_response()
}

/// `GET /artwork/{kind}/{size}/{file}`
pub async fn proxy(
    State(state): State<AppState>,
    Path((kind, size, file)): Path<(String, String, String)>,
) -> Result<Response, AppError> {
    let kind = AssetKind::parse(&kind)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown artwork kind '{kind}'")))?;
    let size = ImageSize::parse(&size)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown artwork size '{size}'")))?;
    if !is_artwork_file(&file) {
        return Err(ApiError::BadRequest("invalid artwork file name".into()).into());
    }

    let url = state.cdn.resolve(Some(&file), size, kind);
    if state.artwork.has_failed(&url).await {
        debug!(url = %url, "latched artwork, serving placeholder");
        return Ok(placeholder().await);
    }

    match fetch(&state.http, &url).await {
        Ok((content_type, bytes)) => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
            ],
            bytes,
        )
            .into_response()),
        Err(reason) => {
            if state.artwork.mark_failed(&url).await {
                warn!(url = %url, reason = %reason, "artwork failed to load, latching placeholder");
            }
            Ok(placeholder().await)
        }
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<(String, Vec<u8>), String> {
    let resp = client.get(url).send().await.map_err(|e| e.to_string())?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("status {status}"));
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();
    let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
    Ok((content_type, bytes.to_vec()))
}
