//! Tiered content entitlement
//!
//! Per view: the resolver runs once and yields the caller's subscription,
//! the fetcher yields the provider's published catalog, the evaluator decides
//! each item, and the render gate turns each verdict into a presentation.
//! Nothing is cached between views.

pub mod catalog;
pub mod evaluator;
pub mod gate;
pub mod resolver;
pub mod session;
pub mod source;
pub mod view;

pub use catalog::fetch_published_content;
pub use evaluator::is_accessible;
pub use gate::{render, PackageOffer, Presentation, UpgradePrompt};
pub use resolver::resolve_active_subscription;
pub use session::MemberSession;
pub use source::{CatalogSource, SqliteStore, SubscriptionStore};
pub use view::{build_catalog_view, CatalogEntry, CatalogView};

use std::future::Future;
use std::time::Duration;

/// Run a store call under a deadline, mapping expiry to the caller's error
pub async fn with_deadline<T, E, F>(
    limit: Duration,
    call: F,
    on_timeout: impl FnOnce(u64) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(limit.as_millis() as u64)),
    }
}

#[cfg(test)]
pub(crate) mod fixtures;
