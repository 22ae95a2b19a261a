//! Gateway request authentication
//!
//! The upstream auth gateway signs in members and forwards their identity as
//! three headers:
//! - `x-caller-id`: the member's UUID
//! - `x-timestamp`: Unix epoch milliseconds
//! - `x-hash`: SHA-256 hex of `"{caller_id}:{timestamp}:{shared_secret}"`
//!
//! The timestamp must be at most 1000 ms old and at most 1 ms in the future.
//! A shared secret of 0 disables hash checking (caller id still required).

use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::settings::{get_setting, set_setting};

/// Settings key holding the gateway shared secret
pub const SHARED_SECRET_KEY: &str = "api_shared_secret";

/// Authentication error types
#[derive(Debug, Clone)]
pub enum ApiAuthError {
    /// Timestamp outside acceptable window
    InvalidTimestamp {
        timestamp: i64,
        now: i64,
        reason: String,
    },

    /// Hash does not match calculated value
    InvalidHash { provided: String, calculated: String },

    /// Required header absent or unparseable
    MissingHeader(&'static str),

    /// Database error loading shared secret
    DatabaseError(String),
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::InvalidTimestamp { reason, .. } => {
                write!(f, "Invalid timestamp: {}", reason)
            }
            ApiAuthError::InvalidHash { .. } => write!(f, "Invalid hash"),
            ApiAuthError::MissingHeader(name) => write!(f, "Missing or invalid header: {}", name),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

/// Identity fields forwarded by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerCredentials {
    pub caller_id: Uuid,
    pub timestamp: i64,
    pub hash: String,
}

impl CallerCredentials {
    /// Check timestamp and hash against `shared_secret` at time `now_ms`
    pub fn verify(&self, shared_secret: i64, now_ms: i64) -> Result<(), ApiAuthError> {
        if shared_secret == 0 {
            return Ok(());
        }
        validate_timestamp(self.timestamp, now_ms)?;
        validate_hash(&self.hash, self.caller_id, self.timestamp, shared_secret)
    }
}

/// Load the shared secret, generating one on first use
pub async fn load_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let value = get_setting(db, SHARED_SECRET_KEY)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match value {
        Some(value) => value
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64: {}", e))),
        None => initialize_shared_secret(db).await,
    }
}

/// Generate and store a random non-zero shared secret
pub async fn initialize_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let secret: i64 = loop {
        let val = rng.gen::<i64>();
        if val != 0 {
            break val;
        }
    };

    set_setting(db, SHARED_SECRET_KEY, &secret.to_string())
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

/// Validate a request timestamp against `now_ms`
///
/// ```
/// use coachflow_common::api::auth::validate_timestamp;
///
/// let now = 1_760_000_000_000;
/// assert!(validate_timestamp(now - 500, now).is_ok());
/// assert!(validate_timestamp(now - 2000, now).is_err());
/// assert!(validate_timestamp(now + 5, now).is_err());
/// ```
pub fn validate_timestamp(timestamp: i64, now_ms: i64) -> Result<(), ApiAuthError> {
    let Some(diff) = now_ms.checked_sub(timestamp) else {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now: now_ms,
            reason: "Timestamp out of range".to_string(),
        });
    };

    if diff > 1000 {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now: now_ms,
            reason: format!("Timestamp {}ms too old (max 1000ms past)", diff),
        });
    }

    if diff < -1 {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now: now_ms,
            reason: format!("Timestamp {}ms in future (max 1ms future)", diff.unsigned_abs()),
        });
    }

    Ok(())
}

/// SHA-256 hex of `"{caller_id}:{timestamp}:{shared_secret}"`
pub fn calculate_hash(caller_id: Uuid, timestamp: i64, shared_secret: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}:{}", caller_id, timestamp, shared_secret).as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn validate_hash(
    provided: &str,
    caller_id: Uuid,
    timestamp: i64,
    shared_secret: i64,
) -> Result<(), ApiAuthError> {
    let calculated = calculate_hash(caller_id, timestamp, shared_secret);
    if provided.eq_ignore_ascii_case(&calculated) {
        Ok(())
    } else {
        Err(ApiAuthError::InvalidHash {
            provided: provided.to_string(),
            calculated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000_000;

    fn credentials(secret: i64, timestamp: i64) -> CallerCredentials {
        let caller_id = Uuid::from_u128(42);
        CallerCredentials {
            caller_id,
            timestamp,
            hash: calculate_hash(caller_id, timestamp, secret),
        }
    }

    #[test]
    fn test_hash_is_64_hex_chars() {
        let hash = calculate_hash(Uuid::nil(), NOW, 7);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_valid_credentials_pass() {
        assert!(credentials(99, NOW - 10).verify(99, NOW).is_ok());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let err = credentials(99, NOW).verify(100, NOW).unwrap_err();
        assert!(matches!(err, ApiAuthError::InvalidHash { .. }));
    }

    #[test]
    fn test_stale_timestamp_fails() {
        let err = credentials(99, NOW - 1001).verify(99, NOW).unwrap_err();
        assert!(matches!(err, ApiAuthError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_future_timestamp_boundary() {
        assert!(validate_timestamp(NOW + 1, NOW).is_ok());
        assert!(validate_timestamp(NOW + 2, NOW).is_err());
        assert!(validate_timestamp(NOW - 1000, NOW).is_ok());
    }

    #[test]
    fn test_extreme_timestamps_rejected_without_overflow() {
        for ts in [i64::MIN, i64::MAX, i64::MIN + 1] {
            let err = validate_timestamp(ts, NOW).unwrap_err();
            assert!(matches!(err, ApiAuthError::InvalidTimestamp { .. }), "ts={}", ts);
        }
        assert!(validate_timestamp(i64::MAX, i64::MIN).is_err());
        assert!(validate_timestamp(i64::MIN, i64::MAX).is_err());
    }

    #[test]
    fn test_zero_secret_disables_checks() {
        let mut creds = credentials(99, 0);
        creds.hash = "garbage".into();
        assert!(creds.verify(0, NOW).is_ok());
    }
}
