//! Shared HTTP API helpers
//!
//! Pure functions and database operations only; the portal wraps these in
//! framework-specific middleware.

pub mod auth;

pub use auth::{
    calculate_hash, initialize_shared_secret, load_shared_secret, validate_hash,
    validate_timestamp, ApiAuthError, CallerCredentials,
};
