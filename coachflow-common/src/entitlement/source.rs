//! Store seams for the entitlement slice
//!
//! The relational store is the only shared mutable resource. These traits
//! are what the resolver, fetcher, and session talk to; [`SqliteStore`] is
//! the production implementation.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{
    ContentItem, NewSubscription, Package, Subscription, SubscriptionStatus,
};
use crate::db::{content, packages, subscriptions};
use crate::error::{FetchError, ResolutionError};
use crate::tier::Tier;

/// Subscription rows, read and status-transitioned
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Every `active` row for (caller, provider). Order is not relied on.
    async fn active_subscriptions(
        &self,
        caller_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Vec<Subscription>, ResolutionError>;

    async fn create_subscription(&self, new: NewSubscription) -> crate::Result<Subscription>;

    async fn set_status(&self, id: Uuid, status: SubscriptionStatus) -> crate::Result<()>;

    async fn set_tier(&self, id: Uuid, tier: Tier, package_id: Option<Uuid>) -> crate::Result<()>;
}

/// Read-only provider catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn published_content(&self, provider_id: Uuid) -> Result<Vec<ContentItem>, FetchError>;

    async fn published_packages(&self, provider_id: Uuid) -> Result<Vec<Package>, FetchError>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SubscriptionStore for SqliteStore {
    async fn active_subscriptions(
        &self,
        caller_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Vec<Subscription>, ResolutionError> {
        subscriptions::find_active(&self.pool, caller_id, provider_id).await
    }

    async fn create_subscription(&self, new: NewSubscription) -> crate::Result<Subscription> {
        subscriptions::insert_subscription(&self.pool, &new).await
    }

    async fn set_status(&self, id: Uuid, status: SubscriptionStatus) -> crate::Result<()> {
        subscriptions::update_status(&self.pool, id, status).await
    }

    async fn set_tier(&self, id: Uuid, tier: Tier, package_id: Option<Uuid>) -> crate::Result<()> {
        subscriptions::update_tier(&self.pool, id, tier, package_id).await
    }
}

#[async_trait]
impl CatalogSource for SqliteStore {
    async fn published_content(&self, provider_id: Uuid) -> Result<Vec<ContentItem>, FetchError> {
        content::list_published(&self.pool, provider_id).await
    }

    async fn published_packages(&self, provider_id: Uuid) -> Result<Vec<Package>, FetchError> {
        packages::list_published(&self.pool, provider_id).await
    }
}
