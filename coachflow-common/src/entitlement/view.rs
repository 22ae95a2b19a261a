//! Catalog view assembly
//!
//! Resolver result → catalog fetch → per-item verdict → per-item
//! presentation. Failures come back as errors; they are never rendered as
//! locked entries.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::catalog::fetch_published_content;
use super::evaluator::is_accessible;
use super::gate::{render, Presentation};
use super::session::MemberSession;
use super::source::CatalogSource;
use super::with_deadline;
use crate::config::NoSubscriptionPolicy;
use crate::db::models::{ContentType, Subscription};
use crate::error::FetchError;
use crate::storage::ObjectStorage;
use crate::tier::Tier;
use crate::time::now;
use crate::Result;

/// One provider catalog as seen by one caller
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub provider_id: Uuid,
    pub subscription: Option<Subscription>,
    /// Catalog withheld because the caller has no subscription
    pub hidden: bool,
    pub entries: Vec<CatalogEntry>,
    pub unlocked_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub required_tier: Option<Tier>,
    pub presentation: Presentation,
}

/// Build the catalog view for the session's caller and provider
pub async fn build_catalog_view(
    session: &MemberSession<'_>,
    catalog: &dyn CatalogSource,
    storage: &ObjectStorage,
    policy: NoSubscriptionPolicy,
) -> Result<CatalogView> {
    let provider_id = session.provider_id();
    let subscription = session.subscription();

    if subscription.is_none() && policy == NoSubscriptionPolicy::HideCatalog {
        debug!(provider = %provider_id, "No subscription; catalog hidden");
        return Ok(CatalogView {
            provider_id,
            subscription: None,
            hidden: true,
            entries: Vec::new(),
            unlocked_count: 0,
        });
    }

    let items = fetch_published_content(catalog, provider_id, session.deadline()).await?;
    let verdicts: Vec<bool> = items
        .iter()
        .map(|item| is_accessible(item, subscription))
        .collect();

    // Offers only matter for locked entries
    let offers = if verdicts.iter().all(|v| *v) {
        Vec::new()
    } else {
        with_deadline(
            session.deadline(),
            catalog.published_packages(provider_id),
            FetchError::Timeout,
        )
        .await?
    };

    let rendered_at = now();
    let entries: Vec<CatalogEntry> = items
        .into_iter()
        .zip(verdicts)
        .map(|(item, verdict)| CatalogEntry {
            presentation: render(&item, verdict, storage, &offers, rendered_at),
            id: item.id,
            title: item.title,
            description: item.description,
            content_type: item.content_type,
            required_tier: item.required_tier,
        })
        .collect();

    let unlocked_count = entries
        .iter()
        .filter(|e| e.presentation.is_unlocked())
        .count();

    debug!(
        provider = %provider_id,
        caller = %session.caller_id(),
        total = entries.len(),
        unlocked = unlocked_count,
        "Built catalog view"
    );

    Ok(CatalogView {
        provider_id,
        subscription: subscription.cloned(),
        hidden: false,
        entries,
        unlocked_count,
    })
}
