//! Provider console
//!
//! The provider-side writes that entitlement reads: package and content
//! publication, package edits, deletions, and the member roster. A console
//! is only opened for the provider's owner.

use sqlx::SqlitePool;
use std::future::Future;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{
    ContentItem, NewContentItem, NewPackage, Package, PackageChanges, Provider, Subscription,
};
use crate::db::{content, packages, providers, subscriptions};
use crate::entitlement::with_deadline;
use crate::time::now;
use crate::{Error, Result};

/// Draft content item as submitted by a provider
#[derive(Debug, Clone)]
pub struct ContentDraft {
    pub package_id: Option<Uuid>,
    pub required_tier: Option<crate::Tier>,
    pub title: String,
    pub description: Option<String>,
    pub content_type: crate::db::models::ContentType,
    pub storage_ref: String,
    pub sort_order: i64,
}

pub struct ProviderConsole<'a> {
    pool: &'a SqlitePool,
    provider: Provider,
    deadline: Duration,
}

/// Look up a provider under `deadline`, [`Error::NotFound`] if absent
pub async fn require_provider(pool: &SqlitePool, provider_id: Uuid, deadline: Duration) -> Result<Provider> {
    with_deadline(deadline, providers::get_provider(pool, provider_id), Error::Timeout)
        .await?
        .ok_or_else(|| Error::NotFound(format!("provider {}", provider_id)))
}

impl<'a> ProviderConsole<'a> {
    /// Open the console for `provider_id` on behalf of `caller_id`.
    ///
    /// [`Error::Forbidden`] unless the caller owns the provider.
    pub async fn open(
        pool: &'a SqlitePool,
        caller_id: Uuid,
        provider_id: Uuid,
        deadline: Duration,
    ) -> Result<ProviderConsole<'a>> {
        let provider = require_provider(pool, provider_id, deadline).await?;
        if provider.owner_id != caller_id {
            return Err(Error::Forbidden(format!(
                "caller {} does not manage provider {}",
                caller_id, provider_id
            )));
        }
        Ok(Self {
            pool,
            provider,
            deadline,
        })
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        with_deadline(self.deadline, call, Error::Timeout).await
    }

    // ---------------------------------------------------------------------
    // Packages
    // ---------------------------------------------------------------------

    /// All packages, drafts included, newest first
    pub async fn packages(&self) -> Result<Vec<Package>> {
        let call = packages::list_for_provider(self.pool, self.provider.id);
        Ok(with_deadline(self.deadline, call, crate::FetchError::Timeout).await?)
    }

    /// Create a package as an unpublished draft
    pub async fn create_package(&self, changes: PackageChanges) -> Result<Package> {
        validate_package(&changes)?;
        let package = self
            .bounded(packages::insert_package(
                self.pool,
                &NewPackage {
                    provider_id: self.provider.id,
                    name: changes.name.trim().to_string(),
                    tier: changes.tier,
                    price_cents: changes.price_cents,
                    billing_interval: changes.billing_interval,
                    is_published: false,
                },
            ))
            .await?;

        info!(provider = %self.provider.id, package = %package.id, "Created package draft");
        Ok(package)
    }

    pub async fn update_package(&self, package_id: Uuid, changes: PackageChanges) -> Result<Package> {
        validate_package(&changes)?;
        let mut package = self.owned_package(package_id).await?;
        let changes = PackageChanges {
            name: changes.name.trim().to_string(),
            ..changes
        };
        self.bounded(packages::update_package(self.pool, package_id, &changes))
            .await?;

        package.name = changes.name;
        package.tier = changes.tier;
        package.price_cents = changes.price_cents;
        package.billing_interval = changes.billing_interval;
        info!(provider = %self.provider.id, package = %package_id, "Updated package");
        Ok(package)
    }

    /// Publish or hide a package. Hidden packages are no longer offered in
    /// upgrade prompts; existing subscriptions are unaffected.
    pub async fn set_package_published(&self, package_id: Uuid, published: bool) -> Result<Package> {
        let mut package = self.owned_package(package_id).await?;
        self.bounded(packages::set_published(self.pool, package_id, published))
            .await?;
        package.is_published = published;
        info!(provider = %self.provider.id, package = %package_id, published, "Package publication changed");
        Ok(package)
    }

    pub async fn delete_package(&self, package_id: Uuid) -> Result<()> {
        self.owned_package(package_id).await?;
        self.bounded(packages::delete_package(self.pool, package_id))
            .await?;
        info!(provider = %self.provider.id, package = %package_id, "Deleted package");
        Ok(())
    }

    async fn owned_package(&self, package_id: Uuid) -> Result<Package> {
        self.bounded(packages::get_package(self.pool, package_id))
            .await?
            .filter(|p| p.provider_id == self.provider.id)
            .ok_or_else(|| Error::NotFound(format!("package {}", package_id)))
    }

    // ---------------------------------------------------------------------
    // Content
    // ---------------------------------------------------------------------

    /// All content items, drafts included, newest first
    pub async fn content(&self) -> Result<Vec<ContentItem>> {
        let call = content::list_for_provider(self.pool, self.provider.id);
        Ok(with_deadline(self.deadline, call, crate::FetchError::Timeout).await?)
    }

    /// Create a content item as an unpublished draft
    pub async fn create_content(&self, draft: ContentDraft) -> Result<ContentItem> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("title must not be empty".to_string()));
        }
        if draft.storage_ref.trim().is_empty() {
            return Err(Error::InvalidInput("storage_ref must not be empty".to_string()));
        }
        if let Some(package_id) = draft.package_id {
            self.owned_package(package_id).await?;
        }

        let item = self
            .bounded(content::insert_content_item(
                self.pool,
                &NewContentItem {
                    provider_id: self.provider.id,
                    package_id: draft.package_id,
                    required_tier: draft.required_tier,
                    title: title.to_string(),
                    description: draft.description,
                    content_type: draft.content_type,
                    is_published: false,
                    storage_ref: draft.storage_ref.trim().to_string(),
                    sort_order: draft.sort_order,
                    created_at: now(),
                },
            ))
            .await?;

        info!(provider = %self.provider.id, content = %item.id, "Created content draft");
        Ok(item)
    }

    pub async fn set_content_published(&self, content_id: Uuid, published: bool) -> Result<ContentItem> {
        let mut item = self.owned_content(content_id).await?;
        self.bounded(content::set_published(self.pool, content_id, published))
            .await?;
        item.is_published = published;
        info!(provider = %self.provider.id, content = %content_id, published, "Content publication changed");
        Ok(item)
    }

    pub async fn delete_content(&self, content_id: Uuid) -> Result<()> {
        self.owned_content(content_id).await?;
        self.bounded(content::delete_content_item(self.pool, content_id))
            .await?;
        info!(provider = %self.provider.id, content = %content_id, "Deleted content");
        Ok(())
    }

    async fn owned_content(&self, content_id: Uuid) -> Result<ContentItem> {
        let call = content::get_content_item(self.pool, content_id);
        with_deadline(self.deadline, call, crate::FetchError::Timeout)
            .await?
            .filter(|c| c.provider_id == self.provider.id)
            .ok_or_else(|| Error::NotFound(format!("content item {}", content_id)))
    }

    // ---------------------------------------------------------------------
    // Members
    // ---------------------------------------------------------------------

    /// Every subscription at this provider, any status, newest first
    pub async fn members(&self) -> Result<Vec<Subscription>> {
        let call = subscriptions::list_for_provider(self.pool, self.provider.id);
        Ok(with_deadline(self.deadline, call, crate::ResolutionError::Timeout).await?)
    }
}

fn validate_package(changes: &PackageChanges) -> Result<()> {
    if changes.name.trim().is_empty() {
        return Err(Error::InvalidInput("package name must not be empty".to_string()));
    }
    if changes.price_cents < 0 {
        return Err(Error::InvalidInput(format!(
            "price_cents must not be negative: {}",
            changes.price_cents
        )));
    }
    Ok(())
}
