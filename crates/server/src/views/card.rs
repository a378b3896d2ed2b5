use marquee_core::catalog::CatalogItem;
use marquee_core::types::ContentType;
use marquee_core::watchlist::{Watchlist, WatchlistEntry};
use marquee_metadata::images::{AssetKind, ImageSize, ImageUrls};
use serde::Serialize;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: u64,
    pub content_type: ContentType,
    pub title: String,
    pub year: String,
    pub rating: String,
    pub poster_url: String,
    /// `None` when nobody is signed in.
    pub in_watchlist: Option<bool>,
}

/// One decimal place; absent and zero ratings both read as "N/A".
pub fn rating_label(rating: Option<f64>) -> String {
    match rating {
        Some(r) if r > 0.0 => format!("{r:.1}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn year_label(year: Option<i32>) -> String {
    year.map_or_else(|| NOT_AVAILABLE.to_string(), |y| y.to_string())
}

fn title_or_untitled(title: Option<&str>) -> String {
    title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("Untitled")
        .to_string()
}

pub fn build(item: &CatalogItem, images: &ImageUrls, watchlist: Option<&Watchlist>) -> CardView {
    CardView {
        id: item.id,
        content_type: item.content_type,
        title: title_or_untitled(item.title.as_deref()),
        year: year_label(item.year),
        rating: rating_label(item.rating),
        poster_url: images.resolve(
            item.poster_path.as_deref(),
            ImageSize::Medium,
            AssetKind::Poster,
        ),
        in_watchlist: watchlist.map(|w| w.contains(item.content_type, item.id)),
    }
}

/// Card for an entry already on the viewer's watchlist.
pub fn from_entry(entry: &WatchlistEntry, images: &ImageUrls) -> CardView {
    CardView {
        id: entry.id,
        content_type: entry.content_type,
        title: title_or_untitled(entry.title.as_deref()),
        year: year_label(entry.year),
        rating: rating_label(entry.rating),
        poster_url: images.resolve(
            entry.poster_path.as_deref(),
            ImageSize::Medium,
            AssetKind::Poster,
        ),
        in_watchlist: Some(true),
    }
}
