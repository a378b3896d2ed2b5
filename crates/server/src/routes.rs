use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use marquee_core::catalog::{CatalogItem, Page};
use marquee_core::error::ApiError;
use marquee_core::types::{Category, ContentType, Section, TimeWindow};
use marquee_core::watchlist::{WatchlistEntry, Watchlist};
use marquee_db::repo::watchlist;
use marquee_metadata::feed::{Feed, FeedStatus};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::artwork;
use crate::error::AppError;
use crate::identity::{SessionContext, Viewer};
use crate::live_search;
use crate::state::AppState;
use crate::views::card::{self, CardView};
use crate::views::detail::{self, DetailParts, DetailView};
use crate::views::genre_filter::{self, GenreFilterView};
use crate::views::grid::{self, GridView};
use crate::views::search_box::{SearchBox, SearchBoxView};

/// Upper bound for `?pages=` on catalog grids.
pub const MAX_GRID_PAGES: u32 = 5;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/static/placeholder-poster.svg", get(artwork::placeholder))
        .route("/artwork/{kind}/{size}/{file}", get(artwork::proxy))
        .nest("/api/v1", api_router())
        .nest("/api/admin", crate::admin::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/catalog/{content_type}/{category}", get(catalog_grid))
        .route("/search", get(search))
        .route("/search/suggestions", get(search_suggestions))
        .route("/search/live", get(live_search::upgrade))
        .route("/genres/{content_type}", get(genres))
        .route("/titles/{content_type}/{id}", get(title_detail))
        .route("/watchlist", get(get_watchlist))
        .route("/watchlist/toggle", post(toggle_watchlist))
}

fn parse_content_type(raw: &str) -> Result<ContentType, AppError> {
    ContentType::parse(raw).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown content type '{raw}', expected movie or tv")).into()
    })
}

async fn viewer_watchlist(
    state: &AppState,
    session: &SessionContext,
) -> Result<Option<Watchlist>, AppError> {
    match &session.viewer {
        Some(viewer) => Ok(Some(watchlist::list(&state.db, &viewer.user_id).await?)),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Catalog grids
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GridQuery {
    pages: Option<u32>,
    genre: Option<u64>,
    window: Option<String>,
}

async fn catalog_grid(
    State(state): State<AppState>,
    session: SessionContext,
    Path((content_type, category)): Path<(String, String)>,
    Query(query): Query<GridQuery>,
) -> Result<Json<GridView>, AppError> {
    let content_type = parse_content_type(&content_type)?;
    let section = Section::resolve(content_type, Category::parse(&category));
    if section.category().as_str() != category {
        debug!(requested = %category, section = ?section, "category fell back to default section");
    }
    let window = query
        .window
        .as_deref()
        .and_then(TimeWindow::parse)
        .unwrap_or_default();
    let pages = query.pages.unwrap_or(1).clamp(1, MAX_GRID_PAGES);

    let feed = Feed::new(state.catalog.clone(), section).with_window(window);
    if feed.load().await == FeedStatus::Error {
        // One retry from page 1 before the grid shows its error line.
        debug!(section = ?section, "first page failed, refreshing once");
        feed.refresh().await;
    }
    for _ in 1..pages {
        if !feed.load_more().await {
            break;
        }
    }
    let snapshot = feed.snapshot().await;
    feed.close().await;

    let list = viewer_watchlist(&state, &session).await?;
    Ok(Json(grid::build(
        &snapshot,
        query.genre,
        &state.images,
        list.as_ref(),
        &session,
    )))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(rename = "type")]
    content_type: Option<String>,
    page: Option<u32>,
}

pub(crate) fn search_content_type(raw: Option<&str>) -> Result<ContentType, AppError> {
    raw.map_or(Ok(ContentType::Movie), parse_content_type)
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Page<CatalogItem>>, AppError> {
    let content_type = search_content_type(query.content_type.as_deref())?;
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(Page::empty()));
    }

    let page = state
        .catalog
        .search(content_type, q, query.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

async fn search_suggestions(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchBoxView>, AppError> {
    let content_type = search_content_type(query.content_type.as_deref())?;

    let mut search_box = SearchBox::default();
    search_box.input(query.q.clone());
    let q = query.q.trim();
    if !q.is_empty() {
        let page = state.catalog.search(content_type, q, 1).await?;
        search_box.set_results(page.results);
    }

    Ok(Json(search_box.view(&state.images)))
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GenreQuery {
    selected: Option<u64>,
}

async fn genres(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    Query(query): Query<GenreQuery>,
) -> Result<Json<GenreFilterView>, AppError> {
    let content_type = parse_content_type(&content_type)?;
    let genres = state.catalog.genres(content_type).await?;
    Ok(Json(genre_filter::build(content_type, &genres, query.selected)))
}

// ---------------------------------------------------------------------------
// Title detail
// ---------------------------------------------------------------------------

async fn title_detail(
    State(state): State<AppState>,
    session: SessionContext,
    Path((content_type, id)): Path<(String, u64)>,
) -> Result<Json<DetailView>, AppError> {
    let content_type = parse_content_type(&content_type)?;

    let (details, credits, providers) = futures::join!(
        state.catalog.details(content_type, id),
        state.catalog.credits(content_type, id),
        state.catalog.watch_providers(content_type, id),
    );
    let details = details?;

    // Credits and availability are optional extras on the page.
    let credits = credits
        .inspect_err(|e| warn!(id, error = %e, "credits unavailable"))
        .ok();
    let providers = providers
        .inspect_err(|e| warn!(id, error = %e, "watch providers unavailable"))
        .ok();

    let in_watchlist = match &session.viewer {
        Some(viewer) => Some(
            watchlist::contains(&state.db, &viewer.user_id, content_type, id).await?,
        ),
        None => None,
    };

    Ok(Json(detail::build(
        DetailParts {
            details: &details,
            credits: credits.as_ref(),
            providers: providers.as_ref(),
            regions: &state.provider_regions,
            in_watchlist,
        },
        &state.images,
        &session,
    )))
}

// ---------------------------------------------------------------------------
// Watchlist
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WatchlistResponse {
    entries: Vec<WatchlistEntry>,
    cards: Vec<CardView>,
}

fn watchlist_response(state: &AppState, list: Watchlist) -> WatchlistResponse {
    let cards = list
        .entries()
        .iter()
        .map(|e| card::from_entry(e, &state.images))
        .collect();
    WatchlistResponse {
        entries: list.into_entries(),
        cards,
    }
}

async fn get_watchlist(
    viewer: Viewer,
    State(state): State<AppState>,
) -> Result<Json<WatchlistResponse>, AppError> {
    let list = watchlist::list(&state.db, &viewer.user_id).await?;
    Ok(Json(watchlist_response(&state, list)))
}

#[derive(Deserialize)]
struct ToggleRequest {
    id: u64,
    #[serde(default = "default_toggle_type")]
    content_type: String,
}

fn default_toggle_type() -> String {
    ContentType::Movie.as_str().to_string()
}

#[derive(Serialize)]
struct ToggleResponse {
    added: bool,
    #[serde(flatten)]
    list: WatchlistResponse,
}

async fn toggle_watchlist(
    viewer: Viewer,
    State(state): State<AppState>,
    Json(body): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let content_type = parse_content_type(&body.content_type)?;

    // Removal only needs the key; additions snapshot the title's display fields.
    let saved = watchlist::contains(&state.db, &viewer.user_id, content_type, body.id).await?;
    let entry = if saved {
        WatchlistEntry {
            id: body.id,
            content_type,
            title: None,
            year: None,
            rating: None,
            poster_path: None,
            backdrop_path: None,
            added_at: None,
        }
    } else {
        let details = state.catalog.details(content_type, body.id).await?;
        WatchlistEntry::from_item(&details.item, chrono::Utc::now())
    };

    let (added, list) = watchlist::toggle(&state.db, &viewer.user_id, entry).await?;
    info!(user_id = %viewer.user_id, id = body.id, %content_type, added, "watchlist toggled");

    Ok(Json(ToggleResponse {
        added,
        list: watchlist_response(&state, list),
    }))
}
