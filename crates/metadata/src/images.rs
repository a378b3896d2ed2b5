//! TMDB image URL construction, either straight at the CDN or through the
//! local artwork proxy.

use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Local asset served in place of any missing artwork.
pub const PLACEHOLDER_IMAGE: &str = "/static/placeholder-poster.svg";

/// Size token used for search suggestion thumbnails.
pub const THUMBNAIL_SIZE: &str = "w92";

/// Longest file name accepted as TMDB artwork.
pub const MAX_ARTWORK_FILE_LEN: usize = 64;

const ARTWORK_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "svg", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    #[serde(rename = "xlarge")]
    XLarge,
    Original,
    Thumbnail,
}

impl ImageSize {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "xlarge" => Some(Self::XLarge),
            "original" => Some(Self::Original),
            "thumbnail" => Some(Self::Thumbnail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::XLarge => "xlarge",
            Self::Original => "original",
            Self::Thumbnail => "thumbnail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Poster,
    Backdrop,
}

impl AssetKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "poster" => Some(Self::Poster),
            "backdrop" => Some(Self::Backdrop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poster => "poster",
            Self::Backdrop => "backdrop",
        }
    }
}

/// Whether `file` looks like a TMDB artwork file name: `[A-Za-z0-9_-]+`
/// plus a known image extension, no directories.
pub fn is_artwork_file(file: &str) -> bool {
    if file.is_empty() || file.len() > MAX_ARTWORK_FILE_LEN {
        return false;
    }
    let Some((stem, ext)) = file.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && stem
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        && ARTWORK_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
}

/// CDN size token for an asset kind and logical size.
///
/// Backdrops have no `xlarge` rendition; that combination falls back to the
/// medium poster token.
pub fn size_token(kind: AssetKind, size: ImageSize) -> &'static str {
    match (kind, size) {
        (AssetKind::Poster, ImageSize::Small) => "w185",
        (AssetKind::Poster, ImageSize::Medium) => "w342",
        (AssetKind::Poster, ImageSize::Large) => "w500",
        (AssetKind::Poster, ImageSize::XLarge) => "w780",
        (AssetKind::Poster, ImageSize::Original) => "original",
        (AssetKind::Backdrop, ImageSize::Small) => "w300",
        (AssetKind::Backdrop, ImageSize::Medium) => "w780",
        (AssetKind::Backdrop, ImageSize::Large) => "w1280",
        (AssetKind::Backdrop, ImageSize::Original) => "original",
        (AssetKind::Backdrop, ImageSize::XLarge) => "w342",
        (_, ImageSize::Thumbnail) => THUMBNAIL_SIZE,
    }
}

#[derive(Debug, Clone)]
enum Target {
    Cdn(String),
    /// Local route prefix; URLs take the form `{prefix}/{kind}/{size}/{file}`.
    Proxy(String),
}

#[derive(Debug, Clone)]
pub struct ImageUrls {
    target: Target,
}

impl Default for ImageUrls {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE)
    }
}

impl ImageUrls {
    /// URLs pointing straight at the CDN under `base`.
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            target: Target::Cdn(base.trim_end_matches('/').to_string()),
        }
    }

    /// URLs pointing at the local artwork proxy mounted at `prefix`.
    pub fn proxied(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            target: Target::Proxy(prefix.trim_end_matches('/').to_string()),
        }
    }

    /// Resolve an image path to a URL, or the placeholder when there is no path.
    pub fn resolve(&self, path: Option<&str>, size: ImageSize, kind: AssetKind) -> String {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return PLACEHOLDER_IMAGE.to_string();
        };
        match &self.target {
            Target::Cdn(base) => {
                let token = size_token(kind, size);
                if path.starts_with('/') {
                    format!("{base}/{token}{path}")
                } else {
                    format!("{base}/{token}/{path}")
                }
            }
            Target::Proxy(prefix) => {
                let file = path.trim_start_matches('/');
                if !is_artwork_file(file) {
                    return PLACEHOLDER_IMAGE.to_string();
                }
                format!("{prefix}/{}/{}/{file}", kind.as_str(), size.as_str())
            }
        }
    }

    pub fn thumbnail(&self, path: Option<&str>) -> String {
        self.resolve(path, ImageSize::Thumbnail, AssetKind::Poster)
    }
}
