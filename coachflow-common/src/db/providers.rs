//! Provider (coach/gym) queries

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::Provider;
use crate::Result;

pub async fn get_provider(pool: &SqlitePool, id: Uuid) -> Result<Option<Provider>> {
    let row = sqlx::query_as::<_, (Uuid, Uuid, String, String, Option<String>, DateTime<Utc>)>(
        "SELECT id, owner_id, slug, display_name, brand_color, created_at FROM providers WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, owner_id, slug, display_name, brand_color, created_at)| Provider {
        id,
        owner_id,
        slug,
        display_name,
        brand_color,
        created_at,
    }))
}

/// Insert a provider profile owned by `owner_id`. Slugs are unique.
pub async fn insert_provider(
    pool: &SqlitePool,
    owner_id: Uuid,
    slug: &str,
    display_name: &str,
    brand_color: Option<&str>,
) -> Result<Provider> {
    let id = Uuid::new_v4();
    let created_at = crate::time::now();

    sqlx::query(
        r#"
        INSERT INTO providers (id, owner_id, slug, display_name, brand_color, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(slug)
    .bind(display_name)
    .bind(brand_color)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(Provider {
        id,
        owner_id,
        slug: slug.to_string(),
        display_name: display_name.to_string(),
        brand_color: brand_color.map(str::to_string),
        created_at,
    })
}
