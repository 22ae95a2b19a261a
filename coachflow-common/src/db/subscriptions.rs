//! Subscription queries

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{NewSubscription, Subscription, SubscriptionStatus};
use crate::error::ResolutionError;
use crate::{Error, Result};

const SELECT_COLUMNS: &str = r#"
    SELECT id, caller_id, provider_id, package_id, tier, status,
           period_start, period_end, created_at, updated_at
    FROM subscriptions
"#;

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    caller_id: Uuid,
    provider_id: Uuid,
    package_id: Option<Uuid>,
    tier: String,
    status: String,
    period_start: DateTime<Utc>,
    period_end: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = ResolutionError;

    fn try_from(row: SubscriptionRow) -> std::result::Result<Self, Self::Error> {
        let tier = row.tier.parse()?;
        let status = SubscriptionStatus::parse(&row.status).ok_or_else(|| {
            ResolutionError::Decode(format!("subscription {} has status {:?}", row.id, row.status))
        })?;

        Ok(Subscription {
            id: row.id,
            caller_id: row.caller_id,
            provider_id: row.provider_id,
            package_id: row.package_id,
            tier,
            status,
            period_start: row.period_start,
            period_end: row.period_end,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// All active subscriptions for (caller, provider), newest first
pub async fn find_active(
    pool: &SqlitePool,
    caller_id: Uuid,
    provider_id: Uuid,
) -> std::result::Result<Vec<Subscription>, ResolutionError> {
    let sql = format!(
        "{} WHERE caller_id = ? AND provider_id = ? AND status = 'active' ORDER BY created_at DESC, id DESC",
        SELECT_COLUMNS
    );

    let rows: Vec<SubscriptionRow> = sqlx::query_as(&sql)
        .bind(caller_id)
        .bind(provider_id)
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(Subscription::try_from).collect()
}

/// Every subscription at a provider, any status, newest first
pub async fn list_for_provider(
    pool: &SqlitePool,
    provider_id: Uuid,
) -> std::result::Result<Vec<Subscription>, ResolutionError> {
    let sql = format!(
        "{} WHERE provider_id = ? ORDER BY created_at DESC, id DESC",
        SELECT_COLUMNS
    );

    let rows: Vec<SubscriptionRow> = sqlx::query_as(&sql)
        .bind(provider_id)
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(Subscription::try_from).collect()
}

/// Fetch one subscription by id
pub async fn get_subscription(pool: &SqlitePool, id: Uuid) -> Result<Option<Subscription>> {
    let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);

    let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(Subscription::try_from)
        .transpose()
        .map_err(Error::from)
}

/// Insert a subscription row and return it
pub async fn insert_subscription(pool: &SqlitePool, new: &NewSubscription) -> Result<Subscription> {
    let now = crate::time::now();
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO subscriptions
            (id, caller_id, provider_id, package_id, tier, status,
             period_start, period_end, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(new.caller_id)
    .bind(new.provider_id)
    .bind(new.package_id)
    .bind(new.tier.as_str())
    .bind(new.status.as_str())
    .bind(new.period_start)
    .bind(new.period_end)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Subscription {
        id,
        caller_id: new.caller_id,
        provider_id: new.provider_id,
        package_id: new.package_id,
        tier: new.tier,
        status: new.status,
        period_start: new.period_start,
        period_end: new.period_end,
        created_at: now,
        updated_at: now,
    })
}

/// Transition a subscription's status (last write wins)
pub async fn update_status(pool: &SqlitePool, id: Uuid, status: SubscriptionStatus) -> Result<()> {
    let result = sqlx::query("UPDATE subscriptions SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(crate::time::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("subscription {}", id)));
    }
    Ok(())
}

/// Change a subscription's tier and package (last write wins)
pub async fn update_tier(
    pool: &SqlitePool,
    id: Uuid,
    tier: crate::Tier,
    package_id: Option<Uuid>,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE subscriptions SET tier = ?, package_id = ?, updated_at = ? WHERE id = ?",
    )
    .bind(tier.as_str())
    .bind(package_id)
    .bind(crate::time::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("subscription {}", id)));
    }
    Ok(())
}
