//! Search box with a suggestion dropdown.
//!
//! Suggestions are visible only while the input is non-empty, at least one
//! result is present and the dropdown has not been dismissed. Typing or
//! focusing the input undoes a dismissal. A non-blank input counts as
//! loading until results for it arrive.

use marquee_core::catalog::CatalogItem;
use marquee_core::types::ContentType;
use marquee_metadata::images::ImageUrls;
use marquee_metadata::search::SearchState;
use serde::Serialize;

pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct SearchBox {
    query: String,
    results: Vec<CatalogItem>,
    loading: bool,
    dismissed: bool,
}

impl SearchBox {
    pub fn input(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.loading = !self.query.trim().is_empty();
        self.dismissed = false;
    }

    pub fn set_results(&mut self, results: Vec<CatalogItem>) {
        self.results = results;
        self.loading = false;
    }

    /// Mirror the state published by a debounced search. State for any
    /// query other than the current input is ignored; returns whether it
    /// was applied.
    pub fn apply(&mut self, state: &SearchState) -> bool {
        if state.query != self.query {
            return false;
        }
        self.results = state.results.clone();
        self.loading = state.loading;
        true
    }

    /// Outside click.
    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }

    pub fn focus(&mut self) {
        self.dismissed = false;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.loading = false;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions_visible(&self) -> bool {
        !self.dismissed && !self.query.is_empty() && !self.results.is_empty()
    }

    /// Pick the suggestion at `index`: empties the box and returns the
    /// title's page.
    pub fn select(&mut self, index: usize) -> Option<String> {
        let href = self
            .results
            .iter()
            .take(MAX_SUGGESTIONS)
            .nth(index)
            .map(|item| title_href(item.content_type, item.id))?;
        self.clear();
        self.dismissed = true;
        Some(href)
    }

    pub fn view(&self, images: &ImageUrls) -> SearchBoxView {
        let visible = self.suggestions_visible();
        let suggestions = if visible {
            self.results
                .iter()
                .take(MAX_SUGGESTIONS)
                .map(|item| suggestion(item, images))
                .collect()
        } else {
            Vec::new()
        };

        SearchBoxView {
            query: self.query.clone(),
            loading: self.loading,
            show_clear: !self.query.is_empty(),
            suggestions_visible: visible,
            suggestions,
        }
    }
}

pub fn title_href(content_type: ContentType, id: u64) -> String {
    match content_type {
        ContentType::Movie => format!("/movies/{id}"),
        ContentType::Tv => format!("/tv/{id}"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionView {
    pub id: u64,
    pub title: String,
    pub year: Option<i32>,
    /// Omitted for unrated titles.
    pub rating: Option<String>,
    pub thumbnail_url: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchBoxView {
    pub query: String,
    pub loading: bool,
    pub show_clear: bool,
    pub suggestions_visible: bool,
    pub suggestions: Vec<SuggestionView>,
}

fn suggestion(item: &CatalogItem, images: &ImageUrls) -> SuggestionView {
    SuggestionView {
        id: item.id,
        title: item.title.clone().unwrap_or_default(),
        year: item.year,
        rating: item
            .rating
            .filter(|r| *r > 0.0)
            .map(|r| format!("{r:.1}")),
        thumbnail_url: images.thumbnail(item.poster_path.as_deref()),
        href: title_href(item.content_type, item.id),
    }
}
