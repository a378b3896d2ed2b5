pub mod feed;
pub mod images;
pub mod normalize;
pub mod provider;
pub mod search;
pub mod tmdb;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    /// Missing or unusable client configuration, raised before any request is sent.
    #[error("configuration error: {0}")]
    Config(String),
    #[error("TMDB API error: {status} on {endpoint}")]
    Upstream { status: u16, endpoint: String },
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

pub type Result<T, E = MetadataError> = std::result::Result<T, E>;
