//! Content catalog fetcher

use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::source::CatalogSource;
use super::with_deadline;
use crate::db::models::ContentItem;
use crate::error::FetchError;

/// Fetch a provider's published content in catalog order.
///
/// An empty `Ok` means the provider has nothing published. Store failures,
/// expired deadlines, and rows naming an unknown tier are errors.
///
/// Ordering is re-applied here (stable sort on `sort_order`, then
/// `created_at`) so it holds whatever order the source returns.
pub async fn fetch_published_content(
    source: &dyn CatalogSource,
    provider_id: Uuid,
    deadline: Duration,
) -> Result<Vec<ContentItem>, FetchError> {
    let mut items = with_deadline(
        deadline,
        source.published_content(provider_id),
        FetchError::Timeout,
    )
    .await?;

    items.retain(|item| item.is_published && item.provider_id == provider_id);
    items.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then(a.created_at.cmp(&b.created_at))
    });

    debug!(provider = %provider_id, count = items.len(), "Fetched published content");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Package;
    use crate::entitlement::fixtures::{at, item};
    use async_trait::async_trait;

    const DEADLINE: Duration = Duration::from_millis(200);

    enum Behavior {
        Items(Vec<ContentItem>),
        Fail,
        Hang,
    }

    struct FakeCatalog(Behavior);

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn published_content(&self, _provider_id: Uuid) -> Result<Vec<ContentItem>, FetchError> {
            match &self.0 {
                Behavior::Items(items) => Ok(items.clone()),
                Behavior::Fail => Err(FetchError::Store(sqlx::Error::PoolClosed)),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(vec![])
                }
            }
        }

        async fn published_packages(&self, _provider_id: Uuid) -> Result<Vec<Package>, FetchError> {
            Ok(vec![])
        }
    }

    fn provider() -> Uuid {
        item(0, None).provider_id
    }

    #[tokio::test]
    async fn test_empty_catalog_is_ok() {
        let source = FakeCatalog(Behavior::Items(vec![]));
        let items = fetch_published_content(&source, provider(), DEADLINE).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_orders_by_sort_order_then_creation() {
        let mut a = item(1, None);
        a.sort_order = 2;
        a.created_at = at(0);
        let mut b = item(2, None);
        b.sort_order = 1;
        b.created_at = at(5);
        let mut c = item(3, None);
        c.sort_order = 1;
        c.created_at = at(1);

        let source = FakeCatalog(Behavior::Items(vec![a, b, c]));
        let items = fetch_published_content(&source, provider(), DEADLINE).await.unwrap();
        let ids: Vec<u128> = items.iter().map(|i| i.id.as_u128()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_unpublished_items_dropped() {
        let mut draft = item(1, None);
        draft.is_published = false;
        let source = FakeCatalog(Behavior::Items(vec![draft, item(2, None)]));

        let items = fetch_published_content(&source, provider(), DEADLINE).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_u128(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_error_not_empty() {
        let source = FakeCatalog(Behavior::Fail);
        let err = fetch_published_content(&source, provider(), DEADLINE).await.unwrap_err();
        assert!(matches!(err, FetchError::Store(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_hung_source_times_out() {
        let source = FakeCatalog(Behavior::Hang);
        let err = fetch_published_content(&source, provider(), DEADLINE).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(200)));
    }
}
