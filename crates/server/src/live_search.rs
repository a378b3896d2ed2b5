//! Live search over a WebSocket.
//!
//! Each connection owns a [`SearchBox`] and a [`DebouncedSearch`]. Client
//! commands edit the box and feed the debouncer; every change is pushed back
//! as a `state` event carrying the box view.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use marquee_core::types::ContentType;
use marquee_metadata::images::ImageUrls;
use marquee_metadata::provider::CatalogSource;
use marquee_metadata::search::{DebouncedSearch, SearchState};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::AppError;
use crate::state::AppState;
use crate::views::search_box::{SearchBox, SearchBoxView};

/// Client to server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SearchCommand {
    Input { value: String },
    Focus,
    /// Outside click.
    Dismiss,
    Clear,
    Select { index: usize },
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchEvent {
    State(SearchBoxView),
    Navigate { href: String },
}

pub struct LiveSearch {
    search_box: SearchBox,
    search: DebouncedSearch,
    images: ImageUrls,
}

impl LiveSearch {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        content_type: ContentType,
        images: ImageUrls,
        debounce: Duration,
    ) -> Self {
        Self {
            search_box: SearchBox::default(),
            search: DebouncedSearch::spawn(source, content_type, debounce),
            images,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.search.subscribe()
    }

    pub fn view(&self) -> SearchEvent {
        SearchEvent::State(self.search_box.view(&self.images))
    }

    pub fn handle(&mut self, command: SearchCommand) -> Vec<SearchEvent> {
        match command {
            SearchCommand::Input { value } => {
                self.search_box.input(value.clone());
                self.search.set_query(value);
            }
            SearchCommand::Focus => self.search_box.focus(),
            SearchCommand::Dismiss => self.search_box.dismiss(),
            SearchCommand::Clear => {
                self.search_box.clear();
                self.search.set_query(String::new());
            }
            SearchCommand::Select { index } => {
                let Some(href) = self.search_box.select(index) else {
                    return vec![self.view()];
                };
                self.search.set_query(String::new());
                return vec![SearchEvent::Navigate { href }, self.view()];
            }
        }
        vec![self.view()]
    }

    /// Fold in a published search state; `None` when it belongs to an
    /// input that has since changed.
    pub fn apply(&mut self, state: &SearchState) -> Option<SearchEvent> {
        self.search_box.apply(state).then(|| self.view())
    }
}

#[derive(Deserialize)]
pub struct LiveQuery {
    #[serde(rename = "type")]
    content_type: Option<String>,
}

/// `GET /api/v1/search/live?type=movie|tv` (WebSocket upgrade)
pub async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<LiveQuery>,
) -> Result<Response, AppError> {
    let content_type = crate::routes::search_content_type(query.content_type.as_deref())?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, content_type)))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, content_type: ContentType) {
    let mut live = LiveSearch::new(
        state.catalog.clone(),
        content_type,
        state.images.clone(),
        state.search_debounce,
    );
    let mut updates = live.subscribe();
    info!(%content_type, "live search connected");

    if send(&mut socket, &live.view()).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!(error = %e, "live search socket error");
                        break;
                    }
                };
                let command = match serde_json::from_str::<SearchCommand>(text.as_str()) {
                    Ok(command) => command,
                    Err(e) => {
                        debug!(error = %e, "ignoring malformed live search command");
                        continue;
                    }
                };
                for event in live.handle(command) {
                    if send(&mut socket, &event).await.is_err() {
                        return;
                    }
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let published = updates.borrow_and_update().clone();
                let Some(event) = live.apply(&published) else {
                    continue;
                };
                if send(&mut socket, &event).await.is_err() {
                    return;
                }
            }
        }
    }
    debug!("live search disconnected");
}

async fn send(socket: &mut WebSocket, event: &SearchEvent) -> Result<(), axum::Error> {
    let text = serde_json::to_string(event).map_err(axum::Error::new)?;
    socket.send(Message::Text(text.into())).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use marquee_core::catalog::{CatalogItem, Credits, Details, Genre, Page, WatchProviders};
    use marquee_core::types::{Section, TimeWindow};
    use marquee_metadata::{MetadataError, Result};

    use super::*;

    /// Every search returns one title named after the query.
    #[derive(Default)]
    struct EchoSource {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl CatalogSource for EchoSource {
        fn name(&self) -> &str {
            "echo"
        }

        async fn section(&self, _: Section, _: TimeWindow, _: u32) -> Result<Page<CatalogItem>> {
            Ok(Page::empty())
        }

        async fn search(&self, content_type: ContentType, query: &str, _: u32) -> Result<Page<CatalogItem>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(Page {
                page: 1,
                total_pages: 1,
                total_results: 1,
                results: vec![CatalogItem {
                    id: 1396,
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
                    poster_path: Some("/bb.jpg".into()),
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

    fn box_view(event: &SearchEvent) -> &SearchBoxView {
        match event {
            SearchEvent::State(view) => view,
            other => panic!("expected state, got {other:?}"),
        }
    }

    async fn settle(live: &mut LiveSearch, query: &str) -> SearchEvent {
        let mut rx = live.subscribe();
        let state = rx
            .wait_for(|s| s.query == query && !s.loading)
            .await
            .unwrap()
            .clone();
        live.apply(&state).expect("state for the current input")
    }

    #[tokio::test(start_paused = true)]
    async fn typing_is_debounced_into_one_search() {
        let source = Arc::new(EchoSource::default());
        let mut live = LiveSearch::new(
            source.clone(),
            ContentType::Tv,
            ImageUrls::proxied("/artwork"),
            Duration::from_millis(500),
        );

        for text in ["b", "br", "breaking"] {
            let events = live.handle(SearchCommand::Input { value: text.into() });
            assert!(box_view(&events[0]).loading);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let event = settle(&mut live, "breaking").await;
        let view = box_view(&event);
        assert!(view.suggestions_visible);
        assert!(!view.loading);
        assert_eq!(view.suggestions[0].href, "/tv/1396");
        assert_eq!(view.suggestions[0].thumbnail_url, "/artwork/poster/thumbnail/bb.jpg");
        assert_eq!(*source.queries.lock().unwrap(), vec!["breaking".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_focus_and_select() {
        let source = Arc::new(EchoSource::default());
        let mut live = LiveSearch::new(
            source,
            ContentType::Tv,
            ImageUrls::default(),
            Duration::from_millis(500),
        );
        live.handle(SearchCommand::Input { value: "bad".into() });
        settle(&mut live, "bad").await;

        let events = live.handle(SearchCommand::Dismiss);
        assert!(!box_view(&events[0]).suggestions_visible);
        let events = live.handle(SearchCommand::Focus);
        assert!(box_view(&events[0]).suggestions_visible);

        let events = live.handle(SearchCommand::Select { index: 0 });
        assert_eq!(
            events[0],
            SearchEvent::Navigate {
                href: "/tv/1396".into()
            }
        );
        let view = box_view(&events[1]);
        assert_eq!(view.query, "");
        assert!(!view.suggestions_visible);

        // nothing left to pick
        let events = live.handle(SearchCommand::Select { index: 0 });
        assert_eq!(events.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn results_for_a_replaced_input_are_not_applied() {
        let source = Arc::new(EchoSource::default());
        let mut live = LiveSearch::new(
            source,
            ContentType::Movie,
            ImageUrls::default(),
            Duration::from_millis(500),
        );
        live.handle(SearchCommand::Input { value: "dune".into() });
        let stale = SearchState {
            query: "dun".into(),
            loading: false,
            results: vec![],
            error: None,
        };
        assert!(live.apply(&stale).is_none());
    }

    #[test]
    fn commands_and_events_wire_format() {
        let command: SearchCommand =
            serde_json::from_str(r#"{"action":"input","value":"alien"}"#).unwrap();
        assert_eq!(
            command,
            SearchCommand::Input {
                value: "alien".into()
            }
        );
        let command: SearchCommand = serde_json::from_str(r#"{"action":"dismiss"}"#).unwrap();
        assert_eq!(command, SearchCommand::Dismiss);

        let json = serde_json::to_value(SearchEvent::Navigate {
            href: "/movies/1".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["href"], "/movies/1");
    }
}
