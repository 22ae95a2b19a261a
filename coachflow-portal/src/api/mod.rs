//! HTTP API handlers for coachflow-portal

pub mod auth;
pub mod buildinfo;
pub mod catalog;
pub mod console;
pub mod error;
pub mod health;
pub mod subscription;

pub use auth::{auth_middleware, Caller};
pub use buildinfo::get_build_info;
pub use catalog::{get_catalog, list_packages};
pub use console::{
    create_content, create_package, delete_content, delete_package, list_console_content,
    list_console_packages, list_members, publish_content, publish_package, update_package,
};
pub use error::ApiError;
pub use health::health_routes;
pub use subscription::{cancel_subscription, change_tier, get_subscription, register_subscription};
