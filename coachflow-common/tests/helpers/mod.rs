//! Shared fixtures for coachflow-common integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use coachflow_common::db::content::insert_content_item;
use coachflow_common::db::init::init_database;
use coachflow_common::db::models::{ContentType, NewContentItem, Provider};
use coachflow_common::db::providers::insert_provider;
use coachflow_common::Tier;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

/// Fresh database in a temp dir; keep the `TempDir` alive for the test
pub async fn test_db() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("coachflow.db"))
        .await
        .expect("Should initialize database");
    (dir, pool)
}

pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
}

pub async fn provider(pool: &SqlitePool, slug: &str) -> Provider {
    insert_provider(pool, Uuid::new_v4(), slug, &format!("Coach {}", slug), Some("#ff6600"))
        .await
        .expect("Should insert provider")
}

pub async fn content(
    pool: &SqlitePool,
    provider_id: Uuid,
    title: &str,
    required_tier: Option<Tier>,
    sort_order: i64,
    minute: i64,
) -> Uuid {
    insert_content_item(
        pool,
        &NewContentItem {
            provider_id,
            package_id: None,
            required_tier,
            title: title.to_string(),
            description: None,
            content_type: ContentType::Video,
            is_published: true,
            storage_ref: format!("{}/{}.mp4", provider_id, title),
            sort_order,
            created_at: at(minute),
        },
    )
    .await
    .expect("Should insert content")
    .id
}

/// Insert a subscription row directly, bypassing registration checks
pub async fn raw_subscription(
    pool: &SqlitePool,
    caller_id: Uuid,
    provider_id: Uuid,
    tier: &str,
    status: &str,
    minute: i64,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO subscriptions
            (id, caller_id, provider_id, package_id, tier, status,
             period_start, period_end, created_at, updated_at)
        VALUES (?, ?, ?, NULL, ?, ?, ?, NULL, ?, ?)
        "#,
    )
    .bind(id)
    .bind(caller_id)
    .bind(provider_id)
    .bind(tier)
    .bind(status)
    .bind(at(minute))
    .bind(at(minute))
    .bind(at(minute))
    .execute(pool)
    .await
    .expect("Should insert subscription");
    id
}
