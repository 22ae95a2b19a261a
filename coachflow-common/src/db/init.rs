//! Database initialization
//!
//! Creates the membership schema on first run and opens existing databases
//! unchanged. Every statement is idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL lets catalog reads proceed while a subscription update is written
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes on an open pool
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_providers_table(pool).await?;
    create_packages_table(pool).await?;
    create_subscriptions_table(pool).await?;
    create_content_items_table(pool).await?;
    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_providers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS providers (
            id BLOB PRIMARY KEY,
            owner_id BLOB NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            brand_color TEXT,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_packages_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS packages (
            id BLOB PRIMARY KEY,
            provider_id BLOB NOT NULL REFERENCES providers(id),
            name TEXT NOT NULL,
            tier TEXT NOT NULL,
            price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
            billing_interval TEXT NOT NULL DEFAULT 'month',
            is_published INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_packages_provider ON packages(provider_id, is_published)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Subscriptions are never deleted, only status-transitioned.
///
/// No UNIQUE constraint on active rows. Duplicates are resolved by the
/// resolver's tie-break; registration checks before inserting.
async fn create_subscriptions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            id BLOB PRIMARY KEY,
            caller_id BLOB NOT NULL,
            provider_id BLOB NOT NULL REFERENCES providers(id),
            package_id BLOB REFERENCES packages(id),
            tier TEXT NOT NULL,
            status TEXT NOT NULL,
            period_start TIMESTAMP NOT NULL,
            period_end TIMESTAMP,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_subscriptions_lookup ON subscriptions(caller_id, provider_id, status)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_content_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content_items (
            id BLOB PRIMARY KEY,
            provider_id BLOB NOT NULL REFERENCES providers(id),
            package_id BLOB REFERENCES packages(id),
            required_tier TEXT,
            title TEXT NOT NULL,
            description TEXT,
            content_type TEXT NOT NULL,
            is_published INTEGER NOT NULL DEFAULT 0,
            storage_ref TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_content_catalog ON content_items(provider_id, is_published, sort_order)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
