use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::types::ContentType;

/// Trimmed copy of a [`CatalogItem`] kept in a user's watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub id: u64,
    #[serde(default = "default_content_type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "posterPath")]
    pub poster_path: Option<String>,
    #[serde(default, alias = "backdropPath")]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

fn default_content_type() -> ContentType {
    ContentType::Movie
}

impl WatchlistEntry {
    pub fn from_item(item: &CatalogItem, added_at: DateTime<Utc>) -> Self {
        Self {
            id: item.id,
            content_type: item.content_type,
            title: item.title.clone(),
            year: item.year,
            rating: item.rating,
            poster_path: item.poster_path.clone(),
            backdrop_path: item.backdrop_path.clone(),
            added_at: Some(added_at),
        }
    }

    /// Movie and show ids overlap on TMDB, so identity is the pair.
    pub fn same_title(&self, content_type: ContentType, id: u64) -> bool {
        self.content_type == content_type && self.id == id
    }
}

/// Ordered list of entries, unique by `(content_type, id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    entries: Vec<WatchlistEntry>,
}

impl Watchlist {
    /// Build from stored entries, keeping the first occurrence of each title.
    pub fn from_entries(entries: Vec<WatchlistEntry>) -> Self {
        let mut list = Self::default();
        for entry in entries {
            if !list.contains(entry.content_type, entry.id) {
                list.entries.push(entry);
            }
        }
        list
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<WatchlistEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, content_type: ContentType, id: u64) -> bool {
        self.entries.iter().any(|e| e.same_title(content_type, id))
    }

    /// Remove the matching entry if present, append otherwise.
    /// Returns `true` when the entry was added. A removed entry that is
    /// toggled back in lands at the end with its new `added_at`.
    pub fn toggle(&mut self, entry: WatchlistEntry) -> bool {
        let pos = self
            .entries
            .iter()
            .position(|e| e.same_title(entry.content_type, entry.id));
        match pos {
            Some(pos) => {
                self.entries.remove(pos);
                false
            }
            None => {
                self.entries.push(entry);
                true
            }
        }
    }
}
