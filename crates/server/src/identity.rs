//! Identity context for requests.
//!
//! Sign-in is handled by the hosted identity provider, which issues HS256
//! bearer tokens whose `sub` claim is the user id. Handlers receive the
//! resulting [`SessionContext`] explicitly instead of reading ambient state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::SignedCookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use marquee_core::error::ApiError;
use serde::Deserialize;
use tracing::debug;

use crate::admin::has_admin_session;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct IdentityClaims {
    sub: String,
}

/// Signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
}

/// Validate an identity-provider token and return the viewer.
pub fn verify_token(token: &str, secret: &str) -> Result<Viewer, ApiError> {
    let data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| ApiError::Unauthorized(format!("invalid token: {e}")))?;

    if data.claims.sub.trim().is_empty() {
        return Err(ApiError::Unauthorized("token has no subject".into()));
    }

    Ok(Viewer {
        user_id: data.claims.sub,
    })
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer)
}

/// Auth schemes are case-insensitive (RFC 7235).
fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Requires a signed-in viewer; reads the Bearer token from the Authorization header.
impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = state
            .identity_secret
            .as_deref()
            .ok_or_else(|| ApiError::Unauthorized("identity provider not configured".into()))?;

        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

        Ok(verify_token(token, secret)?)
    }
}

/// Who is asking: the signed-in viewer, if any, and whether the admin gate is open.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub viewer: Option<Viewer>,
    pub admin: bool,
}

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let viewer = match (state.identity_secret.as_deref(), bearer_token(parts)) {
            (Some(secret), Some(token)) => match verify_token(token, secret) {
                Ok(viewer) => Some(viewer),
                Err(e) => {
                    debug!(error = %e, "ignoring unusable identity token");
                    None
                }
            },
            _ => None,
        };

        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());

        Ok(SessionContext {
            viewer,
            admin: has_admin_session(&jar),
        })
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token(sub: &str, secret: &str, exp_offset: i64) -> String {
        let exp = chrono::Utc::now().timestamp() + exp_offset;
        encode(
            &Header::default(),
            &serde_json::json!({ "sub": sub, "exp": exp }),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_viewer() {
        let viewer = verify_token(&token("user_1", "s3cret", 3600), "s3cret").unwrap();
        assert_eq!(viewer.user_id, "user_1");
    }

    #[test]
    fn rejects_wrong_secret_expired_and_blank_subject() {
        assert!(verify_token(&token("user_1", "other", 3600), "s3cret").is_err());
        assert!(verify_token(&token("user_1", "s3cret", -3600), "s3cret").is_err());
        assert!(verify_token(&token(" ", "s3cret", 3600), "s3cret").is_err());
        assert!(verify_token("not-a-jwt", "s3cret").is_err());
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(parse_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("BEARER  abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("Basic dXNlcjpwdw=="), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("Bearer"), None);
    }
}
