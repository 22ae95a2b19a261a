//! Common error types for CoachFlow

use thiserror::Error;

/// Common result type for CoachFlow operations
pub type Result<T> = std::result::Result<T, Error>;

/// A tier label outside the registry (e.g. "ultra")
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown tier: {label:?}")]
pub struct UnknownTierError {
    pub label: String,
}

/// Subscription lookup failed before an answer was available
///
/// Distinct from `Ok(None)`, which means the caller has no active subscription.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Subscription store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Subscription lookup timed out after {0} ms")]
    Timeout(u64),

    #[error("Subscription references {0}")]
    UnknownTier(#[from] UnknownTierError),

    /// Row present but not decodable (bad status, malformed id, ...)
    #[error("Malformed subscription row: {0}")]
    Decode(String),
}

impl ResolutionError {
    /// Whether retrying the same view may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolutionError::Store(_) | ResolutionError::Timeout(_))
    }
}

/// Content catalog fetch failed
///
/// Distinct from `Ok(vec![])`, which means the provider has no published items.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Catalog store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Catalog fetch timed out after {0} ms")]
    Timeout(u64),

    #[error("Content item references {0}")]
    UnknownTier(#[from] UnknownTierError),

    #[error("Malformed content row: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether retrying the same view may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Store(_) | FetchError::Timeout(_))
    }
}

/// Common error types across CoachFlow services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store call outlived its deadline
    #[error("Store call timed out after {0} ms")]
    Timeout(u64),

    /// Operation would violate a store invariant (e.g. second active subscription)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    UnknownTier(#[from] UnknownTierError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Caller is not allowed to act on this resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Database(_) | Error::Timeout(_) => true,
            Error::Resolution(e) => e.is_retryable(),
            Error::Fetch(e) => e.is_retryable(),
            _ => false,
        }
    }
}
