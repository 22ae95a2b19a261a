//! Content catalog queries

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{ContentItem, ContentType, NewContentItem};
use crate::error::FetchError;
use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct ContentRow {
    id: Uuid,
    provider_id: Uuid,
    package_id: Option<Uuid>,
    required_tier: Option<String>,
    title: String,
    description: Option<String>,
    content_type: String,
    is_published: bool,
    storage_ref: String,
    sort_order: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for ContentItem {
    type Error = FetchError;

    fn try_from(row: ContentRow) -> std::result::Result<Self, Self::Error> {
        // Empty string is how older uploads stored "no requirement"
        let required_tier = match row.required_tier.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => Some(label.parse()?),
        };
        let content_type = ContentType::parse(&row.content_type).ok_or_else(|| {
            FetchError::Decode(format!(
                "content item {} has type {:?}",
                row.id, row.content_type
            ))
        })?;

        Ok(ContentItem {
            id: row.id,
            provider_id: row.provider_id,
            package_id: row.package_id,
            required_tier,
            title: row.title,
            description: row.description,
            content_type,
            is_published: row.is_published,
            storage_ref: row.storage_ref,
            sort_order: row.sort_order,
            created_at: row.created_at,
        })
    }
}

/// Published content of a provider in catalog order
///
/// Order: `sort_order` ascending, then `created_at` ascending, then `id`.
pub async fn list_published(
    pool: &SqlitePool,
    provider_id: Uuid,
) -> std::result::Result<Vec<ContentItem>, FetchError> {
    let rows: Vec<ContentRow> = sqlx::query_as(
        r#"
        SELECT id, provider_id, package_id, required_tier, title, description,
               content_type, is_published, storage_ref, sort_order, created_at
        FROM content_items
        WHERE provider_id = ? AND is_published = 1
        ORDER BY sort_order ASC, created_at ASC, id ASC
        "#,
    )
    .bind(provider_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ContentItem::try_from).collect()
}

/// Every content item of a provider, drafts included, newest first
pub async fn list_for_provider(
    pool: &SqlitePool,
    provider_id: Uuid,
) -> std::result::Result<Vec<ContentItem>, FetchError> {
    let rows: Vec<ContentRow> = sqlx::query_as(
        r#"
        SELECT id, provider_id, package_id, required_tier, title, description,
               content_type, is_published, storage_ref, sort_order, created_at
        FROM content_items
        WHERE provider_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(provider_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ContentItem::try_from).collect()
}

pub async fn get_content_item(
    pool: &SqlitePool,
    id: Uuid,
) -> std::result::Result<Option<ContentItem>, FetchError> {
    let row: Option<ContentRow> = sqlx::query_as(
        r#"
        SELECT id, provider_id, package_id, required_tier, title, description,
               content_type, is_published, storage_ref, sort_order, created_at
        FROM content_items
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(ContentItem::try_from).transpose()
}

/// Insert a content item's metadata and return it
pub async fn insert_content_item(pool: &SqlitePool, new: &NewContentItem) -> Result<ContentItem> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO content_items
            (id, provider_id, package_id, required_tier, title, description,
             content_type, is_published, storage_ref, sort_order, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(new.provider_id)
    .bind(new.package_id)
    .bind(new.required_tier.map(|t| t.as_str()))
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.content_type.as_str())
    .bind(new.is_published)
    .bind(&new.storage_ref)
    .bind(new.sort_order)
    .bind(new.created_at)
    .execute(pool)
    .await?;

    Ok(ContentItem {
        id,
        provider_id: new.provider_id,
        package_id: new.package_id,
        required_tier: new.required_tier,
        title: new.title.clone(),
        description: new.description.clone(),
        content_type: new.content_type,
        is_published: new.is_published,
        storage_ref: new.storage_ref.clone(),
        sort_order: new.sort_order,
        created_at: new.created_at,
    })
}

pub async fn set_published(pool: &SqlitePool, id: Uuid, published: bool) -> Result<()> {
    let result = sqlx::query("UPDATE content_items SET is_published = ? WHERE id = ?")
        .bind(published)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("content item {}", id)));
    }
    Ok(())
}

/// Delete a content item's metadata. The stored object is left in place.
pub async fn delete_content_item(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM content_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("content item {}", id)));
    }
    Ok(())
}
