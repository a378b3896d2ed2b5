//! Admin gate: a fixed username/password pair that sets a signed session cookie.
//!
//! Credentials are compared in plaintext against configured values with no
//! rate limiting. It keeps casual visitors out of the admin page and nothing
//! more.

use axum::body::Bytes;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use marquee_core::error::ApiError;
use serde::Serialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::AppState;

pub const ADMIN_COOKIE: &str = "admin_session";
pub const SESSION_HOURS: i64 = 12;

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
    secure_cookies: bool,
}

impl AdminCredentials {
    pub fn new(username: &str, password: &str, secure_cookies: bool) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.trim().to_string(),
            secure_cookies,
        }
    }

    /// Compare trimmed credentials against the configured pair.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = username.trim().as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.trim().as_bytes().ct_eq(self.password.as_bytes());
        (user_ok & pass_ok).into()
    }

    fn session_cookie(&self) -> Cookie<'static> {
        Cookie::build((ADMIN_COOKIE, "true"))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(time::Duration::hours(SESSION_HOURS))
            .build()
    }
}

/// Whether the jar holds a valid (correctly signed) admin session flag.
pub fn has_admin_session(jar: &SignedCookieJar) -> bool {
    jar.get(ADMIN_COOKIE).is_some_and(|c| c.value() == "true")
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/overview", get(overview))
}

/// Read a credential field leniently: strings as-is, other scalars stringified,
/// anything missing as empty.
fn field(body: &Value, key: &str) -> String {
    match &body[key] {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    body: Bytes,
) -> Result<(SignedCookieJar, Json<Value>), AppError> {
    // Malformed bodies are treated as empty credentials.
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let username = field(&body, "username");
    let password = field(&body, "password");

    if !state.admin.matches(&username, &password) {
        warn!("admin login rejected");
        return Err(ApiError::Unauthorized("invalid credentials".into()).into());
    }

    info!("admin login accepted");
    Ok((
        jar.add(state.admin.session_cookie()),
        Json(json!({ "success": true })),
    ))
}

async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Json<Value>) {
    (
        jar.remove(Cookie::build(ADMIN_COOKIE).path("/")),
        Json(json!({ "success": true })),
    )
}

#[derive(Serialize)]
struct SessionStatus {
    authenticated: bool,
}

async fn me(jar: SignedCookieJar) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: has_admin_session(&jar),
    })
}

/// Extractor for admin-only routes.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        if has_admin_session(&jar) {
            Ok(AdminSession)
        } else {
            Err(ApiError::Unauthorized("admin session required".into()).into())
        }
    }
}

#[derive(Serialize)]
struct Overview {
    catalog_source: String,
    provider_regions: Vec<String>,
    watchlists: i64,
    latched_artwork: usize,
}

async fn overview(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Overview>, AppError> {
    let watchlists = marquee_db::repo::kv::count_prefix(
        &state.db,
        marquee_db::repo::watchlist::KEY_PREFIX,
    )
    .await?;

    Ok(Json(Overview {
        catalog_source: state.catalog.name().to_string(),
        provider_regions: state.provider_regions.to_vec(),
        watchlists,
        latched_artwork: state.artwork.len().await,
    }))
}
