//! Display model shared by the client, the fetch layer and the views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ContentType;

/// Normalized movie or show record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    pub content_type: ContentType,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub year: Option<i32>,
    /// Average vote on TMDB's 0-10 scale.
    pub rating: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub adult: bool,
    pub genre_ids: Vec<u64>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub original_language: Option<String>,
}

impl CatalogItem {
    pub fn has_genre(&self, genre_id: u64) -> bool {
        self.genre_ids.contains(&genre_id)
    }
}

/// One page of a paginated upstream listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            page: 1,
            total_pages: 0,
            total_results: 0,
            results: Vec::new(),
        }
    }

    /// Whether the provider reports pages after this one.
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Full record for a single title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Details {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub tagline: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub status: Option<String>,
    pub homepage: Option<String>,
    pub genres: Vec<Genre>,
    pub production_companies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

impl Credits {
    pub fn directors(&self) -> impl Iterator<Item = &CrewMember> {
        self.crew
            .iter()
            .filter(|c| c.job.as_deref() == Some("Director"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: u64,
    pub name: String,
    pub logo_path: Option<String>,
}

/// Streaming availability for one region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionProviders {
    pub link: Option<String>,
    pub flatrate: Vec<Provider>,
    pub rent: Vec<Provider>,
    pub buy: Vec<Provider>,
}

/// Streaming availability keyed by ISO 3166-1 region code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchProviders {
    pub regions: BTreeMap<String, RegionProviders>,
}

impl WatchProviders {
    /// First region from `preference` that has data, with its code.
    pub fn for_regions<'a>(&'a self, preference: &[String]) -> Option<(&'a str, &'a RegionProviders)> {
        preference.iter().find_map(|code| {
            self.regions
                .get_key_value(code.as_str())
                .map(|(k, v)| (k.as_str(), v))
        })
    }
}
