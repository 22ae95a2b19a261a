//! Gateway authentication middleware
//!
//! Reads `x-caller-id`, `x-timestamp`, and `x-hash`, verifies them against the
//! shared secret, and hands the caller id to handlers as [`Caller`].

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use coachflow_common::api::auth::{ApiAuthError, CallerCredentials};
use coachflow_common::time::now_millis;
use tracing::warn;
use uuid::Uuid;

use super::error::ApiError;
use crate::AppState;

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const HASH_HEADER: &str = "x-hash";

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Uuid);

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, ApiAuthError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiAuthError::MissingHeader(name))
}

/// Parse gateway headers. Timestamp and hash may be absent when auth is
/// disabled (shared secret 0).
fn credentials(headers: &HeaderMap, shared_secret: i64) -> Result<CallerCredentials, ApiAuthError> {
    let caller_id = header(headers, CALLER_ID_HEADER)?
        .parse::<Uuid>()
        .map_err(|_| ApiAuthError::MissingHeader(CALLER_ID_HEADER))?;

    if shared_secret == 0 {
        return Ok(CallerCredentials {
            caller_id,
            timestamp: 0,
            hash: String::new(),
        });
    }

    let timestamp = header(headers, TIMESTAMP_HEADER)?
        .parse::<i64>()
        .map_err(|_| ApiAuthError::MissingHeader(TIMESTAMP_HEADER))?;
    let hash = header(headers, HASH_HEADER)?.to_string();

    Ok(CallerCredentials {
        caller_id,
        timestamp,
        hash,
    })
}

/// Authentication middleware for `/api/providers/*`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let creds = credentials(request.headers(), state.shared_secret)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    creds
        .verify(state.shared_secret, now_millis())
        .map_err(|e| {
            if let ApiAuthError::InvalidHash { provided, calculated } = &e {
                warn!(
                    "Hash validation failed: provided={}, calculated={}",
                    provided, calculated
                );
            }
            ApiError::Unauthorized(e.to_string())
        })?;

    request.extensions_mut().insert(Caller(creds.caller_id));
    Ok(next.run(request).await)
}
