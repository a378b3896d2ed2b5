use serde::Serialize;
use thiserror::Error;

/// Unified API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream returned {status} for {endpoint}")]
    Upstream { status: u16, endpoint: String },

    #[error("bad gateway: {0}")]
    BadGateway(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Upstream { .. } | Self::BadGateway(_) => "bad_gateway",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Upstream { .. } | Self::BadGateway(_) => 502,
            Self::ServiceUnavailable(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Structured context attached to the envelope's `details` field.
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::Upstream { status, endpoint } => serde_json::json!({
                "status": status,
                "endpoint": endpoint,
            }),
            _ => serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// JSON error envelope: `{ "error": { "code": "…", "message": "…", "details": {} } }`
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(e: &ApiError) -> Self {
        Self {
            error: ErrorBody {
                code: e.code().to_string(),
                message: e.to_string(),
                details: e.details(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_carries_status_and_endpoint() {
        let err = ApiError::Upstream {
            status: 401,
            endpoint: "/movie/popular".into(),
        };
        assert_eq!(err.status_code(), 502);

        let envelope = ErrorEnvelope::from(&err);
        assert_eq!(envelope.error.code, "bad_gateway");
        assert_eq!(envelope.error.details["status"], 401);
        assert_eq!(envelope.error.details["endpoint"], "/movie/popular");
    }

    #[test]
    fn plain_errors_have_empty_details() {
        let envelope = ErrorEnvelope::from(&ApiError::NotFound("title".into()));
        assert_eq!(envelope.error.code, "not_found");
        assert_eq!(envelope.error.message, "not found: title");
        assert!(envelope.error.details.as_object().unwrap().is_empty());
    }
}
