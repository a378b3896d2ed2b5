//! Paginated section feed with loading / error state.
//!
//! `Idle → Loading → {Success, Error}`; `load_more` moves `Success → Loading →
//! Success` and appends. Each request takes a sequence number and only the
//! latest one may commit, so a slow superseded response can never overwrite a
//! newer one. After [`Feed::close`] nothing commits at all.

use std::sync::Arc;

use marquee_core::catalog::CatalogItem;
use marquee_core::types::{Section, TimeWindow};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::provider::CatalogSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Point-in-time copy of a feed's state.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub section: Section,
    pub status: FeedStatus,
    pub error: Option<String>,
    pub items: Vec<CatalogItem>,
    pub page: u32,
    pub has_more: bool,
}

struct FeedInner {
    status: FeedStatus,
    error: Option<String>,
    items: Vec<CatalogItem>,
    page: u32,
    has_more: bool,
    latest_seq: u64,
    closed: bool,
}

pub struct Feed {
    source: Arc<dyn CatalogSource>,
    section: Section,
    window: TimeWindow,
    inner: Mutex<FeedInner>,
}

impl Feed {
    pub fn new(source: Arc<dyn CatalogSource>, section: Section) -> Self {
        Self {
            source,
            section,
            window: TimeWindow::default(),
            inner: Mutex::new(FeedInner {
                status: FeedStatus::Idle,
                error: None,
                items: Vec::new(),
                page: 0,
                has_more: true,
                latest_seq: 0,
                closed: false,
            }),
        }
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Initial fetch of page 1.
    pub async fn load(&self) -> FeedStatus {
        self.fetch(1, false).await
    }

    /// Restart at page 1, replacing everything loaded so far.
    pub async fn refresh(&self) -> FeedStatus {
        self.fetch(1, false).await
    }

    /// Fetch and append the next page. Only acts from `Success` while more
    /// pages remain; returns whether a request was issued.
    pub async fn load_more(&self) -> bool {
        let next = {
            let inner = self.inner.lock().await;
            if inner.status != FeedStatus::Success || !inner.has_more {
                return false;
            }
            inner.page + 1
        };
        self.fetch(next, true).await;
        true
    }

    /// Teardown latch: results arriving afterwards are dropped.
    pub async fn close(&self) {
        self.inner.lock().await.closed = true;
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let inner = self.inner.lock().await;
        FeedSnapshot {
            section: self.section,
            status: inner.status,
            error: inner.error.clone(),
            items: inner.items.clone(),
            page: inner.page,
            has_more: inner.has_more,
        }
    }

    async fn fetch(&self, page: u32, append: bool) -> FeedStatus {
        let seq = {
            let mut inner = self.inner.lock().await;
            if inner.closed {
                return inner.status;
            }
            inner.latest_seq += 1;
            inner.status = FeedStatus::Loading;
            inner.error = None;
            inner.latest_seq
        };

        let result = self.source.section(self.section, self.window, page).await;

        let mut inner = self.inner.lock().await;
        if inner.closed {
            debug!(section = ?self.section, page, "feed closed, dropping response");
            return inner.status;
        }
        if seq != inner.latest_seq {
            debug!(section = ?self.section, page, seq, "superseded response discarded");
            return inner.status;
        }

        match result {
            Ok(fetched) => {
                if append {
                    inner.items.extend(fetched.results);
                } else {
                    inner.items = fetched.results;
                }
                inner.has_more = page < fetched.total_pages;
                inner.page = page;
                inner.status = FeedStatus::Success;
            }
            Err(e) => {
                warn!(section = ?self.section, page, error = %e, "feed fetch failed");
                inner.error = Some(e.to_string());
                inner.status = FeedStatus::Error;
            }
        }
        inner.status
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use marquee_core::catalog::{Credits, Details, Genre, Page, WatchProviders};
    use marquee_core::types::ContentType;
    use tokio::sync::Notify;

    use super::*;
    use crate::{MetadataError, Result};

    fn item(id: u64) -> CatalogItem {
        CatalogItem {
            id,
            content_type: ContentType::Movie,
            title: Some(format!("#{id}")),
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
        }
    }

    /// Serves `total_pages` pages; page n holds ids n*10+1 and n*10+2, or
    /// fixed ids when `overlap` is set. The first call may be held on `gate`.
    struct PagedSource {
        total_pages: u32,
        overlap: bool,
        calls: AtomicUsize,
        fail_page: Option<u32>,
        gate_first_call: bool,
        gate: Notify,
    }

    impl PagedSource {
        fn new(total_pages: u32) -> Self {
            Self {
                total_pages,
                overlap: false,
                calls: AtomicUsize::new(0),
                fail_page: None,
                gate_first_call: false,
                gate: Notify::new(),
            }
        }
    }

    #[async_trait::async_trait]
    impl CatalogSource for PagedSource {
        fn name(&self) -> &str {
            "paged"
        }

        async fn section(&self, _: Section, _: TimeWindow, page: u32) -> Result<Page<CatalogItem>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gate_first_call {
                if call == 0 {
                    self.gate.notified().await;
                } else {
                    self.gate.notify_one();
                }
            }
            if self.fail_page == Some(page) {
                return Err(MetadataError::Upstream {
                    status: 500,
                    endpoint: "/movie/popular".into(),
                });
            }
            let base = if self.overlap { 0 } else { page as u64 * 10 };
            // the gated first call answers with distinguishable ids
            let base = if self.gate_first_call && call == 0 { 900 } else { base };
            Ok(Page {
                page,
                total_pages: self.total_pages,
                total_results: self.total_pages as u64 * 2,
                results: vec![item(base + 1), item(base + 2)],
            })
        }

        async fn search(&self, _: ContentType, _: &str, _: u32) -> Result<Page<CatalogItem>> {
            Ok(Page::empty())
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

    fn ids(snapshot: &FeedSnapshot) -> Vec<u64> {
        snapshot.items.iter().map(|i| i.id).collect()
    }

    #[tokio::test]
    async fn load_more_appends_pages_in_order() {
        let feed = Feed::new(Arc::new(PagedSource::new(10)), Section::MoviePopular);
        assert_eq!(feed.snapshot().await.status, FeedStatus::Idle);

        assert_eq!(feed.load().await, FeedStatus::Success);
        for _ in 0..3 {
            assert!(feed.load_more().await);
        }

        let snap = feed.snapshot().await;
        assert_eq!(snap.status, FeedStatus::Success);
        assert_eq!(snap.page, 4);
        assert!(snap.has_more);
        assert_eq!(ids(&snap), vec![11, 12, 21, 22, 31, 32, 41, 42]);
    }

    #[tokio::test]
    async fn overlapping_pages_keep_duplicates() {
        let mut source = PagedSource::new(5);
        source.overlap = true;
        let feed = Feed::new(Arc::new(source), Section::MovieTopRated);

        feed.load().await;
        feed.load_more().await;
        feed.load_more().await;

        assert_eq!(ids(&feed.snapshot().await), vec![1, 2, 1, 2, 1, 2]);
    }

    #[tokio::test]
    async fn load_more_stops_at_last_page() {
        let feed = Feed::new(Arc::new(PagedSource::new(2)), Section::TvPopular);
        feed.load().await;
        assert!(feed.load_more().await);
        let snap = feed.snapshot().await;
        assert!(!snap.has_more);

        assert!(!feed.load_more().await);
        assert_eq!(feed.snapshot().await.items.len(), 4);
    }

    #[tokio::test]
    async fn load_more_requires_success() {
        let feed = Feed::new(Arc::new(PagedSource::new(3)), Section::MoviePopular);
        assert!(!feed.load_more().await);
        assert_eq!(feed.snapshot().await.status, FeedStatus::Idle);
    }

    #[tokio::test]
    async fn refresh_restarts_at_first_page() {
        let feed = Feed::new(Arc::new(PagedSource::new(10)), Section::MovieUpcoming);
        feed.load().await;
        feed.load_more().await;
        feed.load_more().await;

        assert_eq!(feed.refresh().await, FeedStatus::Success);
        let snap = feed.snapshot().await;
        assert_eq!(snap.page, 1);
        assert_eq!(ids(&snap), vec![11, 12]);
    }

    #[tokio::test]
    async fn errors_are_captured_as_messages() {
        let mut source = PagedSource::new(5);
        source.fail_page = Some(2);
        let feed = Feed::new(Arc::new(source), Section::MoviePopular);

        feed.load().await;
        feed.load_more().await;

        let snap = feed.snapshot().await;
        assert_eq!(snap.status, FeedStatus::Error);
        assert!(snap.error.as_deref().unwrap().contains("500"));
        // page 1 stays loaded
        assert_eq!(ids(&snap), vec![11, 12]);
        assert!(!feed.load_more().await);
    }

    #[tokio::test]
    async fn superseded_response_is_discarded() {
        let mut source = PagedSource::new(5);
        source.gate_first_call = true;
        let feed = Feed::new(Arc::new(source), Section::MoviePopular);

        // the first load stays in flight until the refresh has committed
        tokio::join!(feed.load(), feed.refresh());

        let snap = feed.snapshot().await;
        assert_eq!(snap.status, FeedStatus::Success);
        assert_eq!(ids(&snap), vec![11, 12]);
    }

    #[tokio::test]
    async fn closed_feed_ignores_results() {
        let feed = Feed::new(Arc::new(PagedSource::new(5)), Section::MoviePopular);
        feed.close().await;
        feed.load().await;

        let snap = feed.snapshot().await;
        assert_eq!(snap.status, FeedStatus::Idle);
        assert!(snap.items.is_empty());
    }
}
