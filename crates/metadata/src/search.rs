//! Debounced live search.
//!
//! Input is pushed through a `watch` channel; a background task waits until
//! the input has been stable for the debounce interval before querying the
//! source. Responses are tagged with the query they were issued for and
//! dropped when the input has moved on in the meantime.

use std::sync::Arc;
use std::time::Duration;

use marquee_core::catalog::CatalogItem;
use marquee_core::types::ContentType;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::provider::CatalogSource;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    /// Query the current results belong to.
    pub query: String,
    pub loading: bool,
    pub results: Vec<CatalogItem>,
    pub error: Option<String>,
}

pub struct DebouncedSearch {
    input: watch::Sender<String>,
    output: watch::Receiver<SearchState>,
    task: JoinHandle<()>,
}

impl DebouncedSearch {
    pub fn spawn(
        source: Arc<dyn CatalogSource>,
        content_type: ContentType,
        debounce: Duration,
    ) -> Self {
        let (input, input_rx) = watch::channel(String::new());
        let (output_tx, output) = watch::channel(SearchState::default());
        let task = tokio::spawn(run(source, content_type, debounce, input_rx, output_tx));
        Self {
            input,
            output,
            task,
        }
    }

    /// Replace the input text, restarting the debounce timer.
    pub fn set_query(&self, query: impl Into<String>) {
        self.input.send_replace(query.into());
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.output.clone()
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    source: Arc<dyn CatalogSource>,
    content_type: ContentType,
    debounce: Duration,
    mut input: watch::Receiver<String>,
    output: watch::Sender<SearchState>,
) {
    loop {
        if input.changed().await.is_err() {
            return;
        }

        // Any change inside the window restarts it.
        loop {
            match tokio::time::timeout(debounce, input.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => return,
                Err(_elapsed) => break,
            }
        }

        let query = input.borrow_and_update().clone();
        if query.trim().is_empty() {
            output.send_replace(SearchState {
                query,
                ..SearchState::default()
            });
            continue;
        }

        output.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        debug!(query = %query, "search request");
        let result = source.search(content_type, query.trim(), 1).await;

        if *input.borrow() != query {
            debug!(query = %query, "stale search response discarded");
            continue;
        }

        let state = match result {
            Ok(page) => SearchState {
                query,
                loading: false,
                results: page.results,
                error: None,
            },
            Err(e) => {
                warn!(query = %query, error = %e, "search failed");
                SearchState {
                    query,
                    loading: false,
                    results: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        output.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::catalog::{Credits, Details, Genre, Page, WatchProviders};
    use marquee_core::types::{Section, TimeWindow};
    use tokio::sync::{Mutex, Notify};

    use super::*;
    use crate::{MetadataError, Result};

    /// Answers every search with one item titled after the query. Searches
    /// for `held` block until `release` is notified.
    #[derive(Default)]
    struct RecordingSource {
        queries: Mutex<Vec<String>>,
        held: Option<String>,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl CatalogSource for RecordingSource {
        fn name(&self) -> &str {
            "recording"
        }

        async fn section(&self, _: Section, _: TimeWindow, _: u32) -> Result<Page<CatalogItem>> {
            Ok(Page::empty())
        }

        async fn search(&self, content_type: ContentType, query: &str, _: u32) -> Result<Page<CatalogItem>> {
            self.queries.lock().await.push(query.to_string());
            if self.held.as_deref() == Some(query) {
                self.release.notified().await;
            }
            if query == "boom" {
                return Err(MetadataError::Upstream {
                    status: 503,
                    endpoint: "/search/movie".into(),
                });
            }
            Ok(Page {
                page: 1,
                total_pages: 1,
                total_results: 1,
                results: vec![CatalogItem {
                    id: query.len() as u64,
                    content_type,
                    title: Some(query.to_string()),
                    original_title: None,
                    overview: None,
                    release_date: None,
                    year: None,
                    rating: None,
                    vote_count: None,
                    popularity: None,
                    adult: false,
                    genre_ids: vec![],
                    poster_path: None,
                    backdrop_path: None,
                    original_language: None,
                }],
            })
        }

        async fn details(&self, _: ContentType, _: u64) -> Result<Details> {
            Err(MetadataError::Decode("unused".into()))
        }

        async fn credits(&self, _: ContentType, _: u64) -> Result<Credits> {
            Ok(Credits::default())
        }

        async fn watch_providers(&self, _: ContentType, _: u64) -> Result<WatchProviders> {
            Ok(WatchProviders::default())
        }

        async fn genres(&self, _: ContentType) -> Result<Vec<Genre>> {
            Ok(vec![])
        }
    }

    async fn settled(search: &DebouncedSearch, query: &str) -> SearchState {
        let mut rx = search.subscribe();
        let state = rx
            .wait_for(|s| s.query == query && !s.loading)
            .await
            .unwrap()
            .clone();
        state
    }

    fn titles(state: &SearchState) -> Vec<&str> {
        state
            .results
            .iter()
            .filter_map(|i| i.title.as_deref())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_issues_one_request_for_the_last_value() {
        let source = Arc::new(RecordingSource::default());
        let search = DebouncedSearch::spawn(source.clone(), ContentType::Movie, DEFAULT_DEBOUNCE);

        for text in ["d", "du", "dun", "dune"] {
            search.set_query(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(source.queries.lock().await.is_empty(), "fired before the interval elapsed");

        let state = settled(&search, "dune").await;
        assert_eq!(titles(&state), ["dune"]);
        assert_eq!(*source.queries.lock().await, vec!["dune".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_clears_without_request() {
        let source = Arc::new(RecordingSource::default());
        let search = DebouncedSearch::spawn(source.clone(), ContentType::Movie, DEFAULT_DEBOUNCE);

        search.set_query("alien");
        assert_eq!(titles(&settled(&search, "alien").await), ["alien"]);

        search.set_query("   ");
        let state = settled(&search, "   ").await;
        assert!(state.results.is_empty());
        assert_eq!(source.queries.lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_dropped() {
        let source = Arc::new(RecordingSource {
            held: Some("dune".into()),
            ..Default::default()
        });
        let search = DebouncedSearch::spawn(source.clone(), ContentType::Movie, DEFAULT_DEBOUNCE);

        search.set_query("dune");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(search.subscribe().borrow().loading);

        search.set_query("alien");
        source.release.notify_one();

        let state = settled(&search, "alien").await;
        assert_eq!(titles(&state), ["alien"]);
        assert_eq!(
            *source.queries.lock().await,
            vec!["dune".to_string(), "alien".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn errors_surface_as_messages() {
        let source = Arc::new(RecordingSource::default());
        let search = DebouncedSearch::spawn(source, ContentType::Tv, DEFAULT_DEBOUNCE);

        search.set_query("boom");
        let state = settled(&search, "boom").await;
        assert!(state.results.is_empty());
        assert!(state.error.as_deref().unwrap().contains("503"));
    }
}
