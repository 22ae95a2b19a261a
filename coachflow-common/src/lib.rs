//! # CoachFlow Common Library
//!
//! Shared code for the CoachFlow membership services including:
//! - Tier registry and entitlement evaluation
//! - Provider console (publication, edits, member roster)
//! - Subscription and content catalog models
//! - Database initialization and queries
//! - Configuration loading
//! - Gateway authentication helpers
//! - Object storage URL construction

pub mod api;
pub mod config;
pub mod console;
pub mod db;
pub mod entitlement;
pub mod error;
pub mod storage;
pub mod tier;
pub mod time;

pub use error::{Error, FetchError, ResolutionError, Result, UnknownTierError};
pub use tier::{Rank, Tier};
