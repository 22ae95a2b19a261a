//! Database models and queries

pub mod content;
pub mod init;
pub mod models;
pub mod packages;
pub mod providers;
pub mod settings;
pub mod subscriptions;

pub use init::*;
pub use models::*;
