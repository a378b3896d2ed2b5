use marquee_core::catalog::CatalogItem;
use marquee_core::types::{ContentType, Section};
use marquee_core::watchlist::Watchlist;
use marquee_metadata::feed::{FeedSnapshot, FeedStatus};
use marquee_metadata::images::ImageUrls;
use serde::Serialize;

use super::SessionView;
use super::card::{self, CardView};
use crate::identity::SessionContext;

/// Skeleton cards shown while the first page is in flight.
pub const LOADING_PLACEHOLDERS: usize = 8;
pub const ERROR_MESSAGE: &str = "Failed to load titles. Please try again later.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GridBody {
    Loading { placeholders: usize },
    Error { message: String },
    Ready { cards: Vec<CardView> },
}

#[derive(Debug, Clone, Serialize)]
pub struct GridView {
    pub section: Section,
    pub content_type: ContentType,
    pub title: &'static str,
    pub genre: Option<u64>,
    pub page: u32,
    pub has_more: bool,
    /// Set whenever the last fetch failed, including a failed later page
    /// underneath cards that did load.
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: GridBody,
    pub session: SessionView,
}

/// Restrict loaded items to one genre. Only what is already loaded is
/// considered; nothing is sent upstream.
pub fn filter_by_genre(items: &[CatalogItem], genre: Option<u64>) -> Vec<&CatalogItem> {
    match genre {
        Some(id) => items.iter().filter(|i| i.has_genre(id)).collect(),
        None => items.iter().collect(),
    }
}

pub fn build(
    snapshot: &FeedSnapshot,
    genre: Option<u64>,
    images: &ImageUrls,
    watchlist: Option<&Watchlist>,
    session: &SessionContext,
) -> GridView {
    let body = match snapshot.status {
        FeedStatus::Idle | FeedStatus::Loading if snapshot.items.is_empty() => {
            GridBody::Loading {
                placeholders: LOADING_PLACEHOLDERS,
            }
        }
        FeedStatus::Error if snapshot.items.is_empty() => GridBody::Error {
            message: ERROR_MESSAGE.to_string(),
        },
        _ => GridBody::Ready {
            cards: filter_by_genre(&snapshot.items, genre)
                .into_iter()
                .map(|item| card::build(item, images, watchlist))
                .collect(),
        },
    };

    GridView {
        section: snapshot.section,
        content_type: snapshot.section.content_type(),
        title: snapshot.section.title(),
        genre,
        page: snapshot.page,
        has_more: snapshot.has_more && matches!(body, GridBody::Ready { .. }),
        error: match snapshot.status {
            FeedStatus::Error => Some(
                snapshot
                    .error
                    .clone()
                    .unwrap_or_else(|| ERROR_MESSAGE.to_string()),
            ),
            _ => None,
        },
        body,
        session: SessionView::from(session),
    }
}
