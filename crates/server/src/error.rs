use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marquee_core::error::{ApiError, ErrorEnvelope};
use marquee_db::DbError;
use marquee_metadata::MetadataError;
use tracing::{error, warn};

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
#[derive(Debug)]
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            match &self.0 {
                ApiError::Internal(msg) => error!(error = %msg, "internal error"),
                other => warn!(code = other.code(), error = %other, "request failed"),
            }
        }
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<MetadataError> for AppError {
    fn from(e: MetadataError) -> Self {
        Self(match e {
            MetadataError::Config(msg) => ApiError::ServiceUnavailable(msg),
            MetadataError::Upstream {
                status: 404,
                endpoint,
            } => ApiError::NotFound(endpoint),
            MetadataError::Upstream { status, endpoint } => ApiError::Upstream { status, endpoint },
            MetadataError::Network(e) => ApiError::BadGateway(format!("network error: {e}")),
            MetadataError::Decode(msg) => ApiError::BadGateway(msg),
        })
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        Self(ApiError::Internal(e.to_string()))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self(ApiError::Internal(format!("database error: {e}")))
    }
}
