use marquee_core::catalog::{CatalogItem, Credits, Details, Genre, Page, WatchProviders};
use marquee_core::types::{ContentType, Section, TimeWindow};

use crate::Result;

/// A catalog backend that lists, searches and describes titles.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    /// One page of a browse section. `window` only applies to trending sections.
    async fn section(
        &self,
        section: Section,
        window: TimeWindow,
        page: u32,
    ) -> Result<Page<CatalogItem>>;

    /// Search titles of one content type by free text.
    async fn search(
        &self,
        content_type: ContentType,
        query: &str,
        page: u32,
    ) -> Result<Page<CatalogItem>>;

    async fn details(&self, content_type: ContentType, id: u64) -> Result<Details>;

    async fn credits(&self, content_type: ContentType, id: u64) -> Result<Credits>;

    /// Streaming availability per region.
    async fn watch_providers(&self, content_type: ContentType, id: u64)
        -> Result<WatchProviders>;

    async fn genres(&self, content_type: ContentType) -> Result<Vec<Genre>>;
}
