//! Error responses
//!
//! Every failure becomes `{"error", "kind", "retryable"}` with a matching
//! status code. Store failures and expired deadlines are retryable 503s, so
//! the client can offer a retry instead of showing content as locked.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coachflow_common::{Error, FetchError, ResolutionError};
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// Store unreachable or too slow; `kind` is `store_unavailable` or `timeout`
    Unavailable { kind: &'static str, message: String },
    /// Subscription lookup failed
    Resolution(ResolutionError),
    /// Catalog fetch failed
    Fetch(FetchError),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Resolution(e) => ApiError::Resolution(e),
            Error::Fetch(e) => ApiError::Fetch(e),
            Error::Database(e) => ApiError::Unavailable {
                kind: "store_unavailable",
                message: e.to_string(),
            },
            Error::Timeout(ms) => ApiError::Unavailable {
                kind: "timeout",
                message: Error::Timeout(ms).to_string(),
            },
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::UnknownTier(e) => ApiError::BadRequest(e.to_string()),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ResolutionError> for ApiError {
    fn from(err: ResolutionError) -> Self {
        ApiError::Resolution(err)
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::Fetch(err)
    }
}

fn resolution_kind(err: &ResolutionError) -> &'static str {
    match err {
        ResolutionError::Store(_) => "store_unavailable",
        ResolutionError::Timeout(_) => "timeout",
        ResolutionError::UnknownTier(_) => "unknown_tier",
        ResolutionError::Decode(_) => "malformed_row",
    }
}

fn fetch_kind(err: &FetchError) -> &'static str {
    match err {
        FetchError::Store(_) => "store_unavailable",
        FetchError::Timeout(_) => "timeout",
        FetchError::UnknownTier(_) => "unknown_tier",
        FetchError::Decode(_) => "malformed_row",
    }
}

fn store_status(retryable: bool) -> StatusCode {
    if retryable {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, retryable, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", false, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", false, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", false, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", false, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", false, msg),
            ApiError::Unavailable { kind, message } => {
                warn!("Store unavailable ({}): {}", kind, message);
                (StatusCode::SERVICE_UNAVAILABLE, kind, true, message)
            }
            ApiError::Resolution(e) => {
                warn!("Subscription resolution failed: {}", e);
                (store_status(e.is_retryable()), resolution_kind(&e), e.is_retryable(), e.to_string())
            }
            ApiError::Fetch(e) => {
                warn!("Catalog fetch failed: {}", e);
                (store_status(e.is_retryable()), fetch_kind(&e), e.is_retryable(), e.to_string())
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", false, msg)
            }
        };

        let body = Json(json!({
            "error": message,
            "kind": kind,
            "retryable": retryable,
        }));

        (status, body).into_response()
    }
}
