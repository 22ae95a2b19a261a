//! Package queries

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{BillingInterval, NewPackage, Package, PackageChanges};
use crate::error::FetchError;
use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    provider_id: Uuid,
    name: String,
    tier: String,
    price_cents: i64,
    billing_interval: String,
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<PackageRow> for Package {
    type Error = FetchError;

    fn try_from(row: PackageRow) -> std::result::Result<Self, Self::Error> {
        let tier = row.tier.parse()?;
        let billing_interval = BillingInterval::parse(&row.billing_interval).ok_or_else(|| {
            FetchError::Decode(format!(
                "package {} has billing interval {:?}",
                row.id, row.billing_interval
            ))
        })?;

        Ok(Package {
            id: row.id,
            provider_id: row.provider_id,
            name: row.name,
            tier,
            price_cents: row.price_cents,
            billing_interval,
            is_published: row.is_published,
            created_at: row.created_at,
        })
    }
}

/// Published packages of a provider, cheapest first
pub async fn list_published(
    pool: &SqlitePool,
    provider_id: Uuid,
) -> std::result::Result<Vec<Package>, FetchError> {
    let rows: Vec<PackageRow> = sqlx::query_as(
        r#"
        SELECT id, provider_id, name, tier, price_cents, billing_interval, is_published, created_at
        FROM packages
        WHERE provider_id = ? AND is_published = 1
        ORDER BY price_cents ASC, created_at ASC
        "#,
    )
    .bind(provider_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Package::try_from).collect()
}

/// Every package of a provider, drafts included, newest first
pub async fn list_for_provider(
    pool: &SqlitePool,
    provider_id: Uuid,
) -> std::result::Result<Vec<Package>, FetchError> {
    let rows: Vec<PackageRow> = sqlx::query_as(
        r#"
        SELECT id, provider_id, name, tier, price_cents, billing_interval, is_published, created_at
        FROM packages
        WHERE provider_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(provider_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Package::try_from).collect()
}

/// Fetch one package by id, published or not
pub async fn get_package(pool: &SqlitePool, id: Uuid) -> Result<Option<Package>> {
    let row: Option<PackageRow> = sqlx::query_as(
        r#"
        SELECT id, provider_id, name, tier, price_cents, billing_interval, is_published, created_at
        FROM packages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Package::try_from).transpose()?)
}

pub async fn insert_package(pool: &SqlitePool, new: &NewPackage) -> Result<Package> {
    let id = Uuid::new_v4();
    let now = crate::time::now();

    sqlx::query(
        r#"
        INSERT INTO packages
            (id, provider_id, name, tier, price_cents, billing_interval, is_published, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(new.provider_id)
    .bind(&new.name)
    .bind(new.tier.as_str())
    .bind(new.price_cents)
    .bind(new.billing_interval.as_str())
    .bind(new.is_published)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Package {
        id,
        provider_id: new.provider_id,
        name: new.name.clone(),
        tier: new.tier,
        price_cents: new.price_cents,
        billing_interval: new.billing_interval,
        is_published: new.is_published,
        created_at: now,
    })
}

/// Overwrite a package's editable fields
pub async fn update_package(pool: &SqlitePool, id: Uuid, changes: &PackageChanges) -> Result<()> {
    let result = sqlx::query(
        "UPDATE packages SET name = ?, tier = ?, price_cents = ?, billing_interval = ? WHERE id = ?",
    )
    .bind(&changes.name)
    .bind(changes.tier.as_str())
    .bind(changes.price_cents)
    .bind(changes.billing_interval.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("package {}", id)));
    }
    Ok(())
}

pub async fn set_published(pool: &SqlitePool, id: Uuid, published: bool) -> Result<()> {
    let result = sqlx::query("UPDATE packages SET is_published = ? WHERE id = ?")
        .bind(published)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("package {}", id)));
    }
    Ok(())
}

/// Delete a package nothing references.
///
/// Packages referenced by a subscription or a content item are refused with
/// [`Error::Conflict`]; unpublish them instead.
pub async fn delete_package(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let references: i64 = sqlx::query_scalar(
        r#"
        SELECT (SELECT COUNT(*) FROM subscriptions WHERE package_id = ?)
             + (SELECT COUNT(*) FROM content_items WHERE package_id = ?)
        "#,
    )
    .bind(id)
    .bind(id)
    .fetch_one(pool)
    .await?;

    if references > 0 {
        return Err(Error::Conflict(format!(
            "package {} is referenced by {} subscriptions or content items",
            id, references
        )));
    }

    let result = sqlx::query("DELETE FROM packages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("package {}", id)));
    }
    Ok(())
}
