//! Subscription resolver

use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::source::SubscriptionStore;
use super::with_deadline;
use crate::db::models::Subscription;
use crate::error::ResolutionError;

/// Find the caller's active subscription at a provider.
///
/// `Ok(None)` means the caller has no active subscription there; a store
/// failure or an expired deadline is an `Err` and must not be read as "none".
///
/// Several active rows can exist for one (caller, provider) pair. The most
/// recently created one wins (ties broken by the larger id) and a warning is
/// logged.
pub async fn resolve_active_subscription(
    store: &dyn SubscriptionStore,
    caller_id: Uuid,
    provider_id: Uuid,
    deadline: Duration,
) -> Result<Option<Subscription>, ResolutionError> {
    let candidates = with_deadline(
        deadline,
        store.active_subscriptions(caller_id, provider_id),
        ResolutionError::Timeout,
    )
    .await?;

    let active: Vec<Subscription> = candidates
        .into_iter()
        .filter(|s| s.is_active() && s.caller_id == caller_id && s.provider_id == provider_id)
        .collect();

    if active.len() > 1 {
        warn!(
            caller = %caller_id,
            provider = %provider_id,
            count = active.len(),
            "Multiple active subscriptions; using the most recently created"
        );
    }

    let chosen = active
        .into_iter()
        .max_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

    debug!(
        caller = %caller_id,
        provider = %provider_id,
        tier = ?chosen.as_ref().map(|s| s.tier),
        "Resolved subscription"
    );

    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewSubscription, SubscriptionStatus};
    use crate::entitlement::fixtures::{at, subscription};
    use crate::tier::Tier;
    use async_trait::async_trait;

    const DEADLINE: Duration = Duration::from_millis(200);

    enum Behavior {
        Rows(Vec<Subscription>),
        Fail,
        Hang,
    }

    struct FakeStore(Behavior);

    #[async_trait]
    impl SubscriptionStore for FakeStore {
        async fn active_subscriptions(
            &self,
            _caller_id: Uuid,
            _provider_id: Uuid,
        ) -> Result<Vec<Subscription>, ResolutionError> {
            match &self.0 {
                Behavior::Rows(rows) => Ok(rows.clone()),
                Behavior::Fail => Err(ResolutionError::Store(sqlx::Error::PoolTimedOut)),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(vec![])
                }
            }
        }

        async fn create_subscription(&self, _new: NewSubscription) -> crate::Result<Subscription> {
            unimplemented!()
        }

        async fn set_status(&self, _id: Uuid, _status: SubscriptionStatus) -> crate::Result<()> {
            unimplemented!()
        }

        async fn set_tier(&self, _id: Uuid, _tier: Tier, _package_id: Option<Uuid>) -> crate::Result<()> {
            unimplemented!()
        }
    }

    fn owned_by(mut sub: Subscription, caller: Uuid, provider: Uuid) -> Subscription {
        sub.caller_id = caller;
        sub.provider_id = provider;
        sub
    }

    #[tokio::test]
    async fn test_no_rows_is_none() {
        let store = FakeStore(Behavior::Rows(vec![]));
        let result = resolve_active_subscription(&store, Uuid::new_v4(), Uuid::new_v4(), DEADLINE).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_single_active_row_returned() {
        let (caller, provider) = (Uuid::new_v4(), Uuid::new_v4());
        let sub = owned_by(subscription(Tier::Premium, SubscriptionStatus::Active), caller, provider);
        let store = FakeStore(Behavior::Rows(vec![sub.clone()]));

        let resolved = resolve_active_subscription(&store, caller, provider, DEADLINE)
            .await
            .unwrap();
        assert_eq!(resolved, Some(sub));
    }

    #[tokio::test]
    async fn test_newest_active_row_wins() {
        let (caller, provider) = (Uuid::new_v4(), Uuid::new_v4());
        let mut older = owned_by(subscription(Tier::Elite, SubscriptionStatus::Active), caller, provider);
        older.created_at = at(0);
        let mut newer = owned_by(subscription(Tier::Basic, SubscriptionStatus::Active), caller, provider);
        newer.created_at = at(10);

        // Store order must not matter
        let store = FakeStore(Behavior::Rows(vec![older, newer.clone()]));
        let resolved = resolve_active_subscription(&store, caller, provider, DEADLINE)
            .await
            .unwrap();
        assert_eq!(resolved.map(|s| s.id), Some(newer.id));
    }

    #[tokio::test]
    async fn test_same_timestamp_tie_broken_by_id() {
        let (caller, provider) = (Uuid::new_v4(), Uuid::new_v4());
        let mut a = owned_by(subscription(Tier::Basic, SubscriptionStatus::Active), caller, provider);
        a.id = Uuid::from_u128(1);
        let mut b = owned_by(subscription(Tier::Elite, SubscriptionStatus::Active), caller, provider);
        b.id = Uuid::from_u128(2);

        let store = FakeStore(Behavior::Rows(vec![b.clone(), a]));
        let resolved = resolve_active_subscription(&store, caller, provider, DEADLINE)
            .await
            .unwrap();
        assert_eq!(resolved.map(|s| s.id), Some(b.id));
    }

    #[tokio::test]
    async fn test_inactive_rows_from_store_ignored() {
        let (caller, provider) = (Uuid::new_v4(), Uuid::new_v4());
        let cancelled = owned_by(subscription(Tier::Elite, SubscriptionStatus::Cancelled), caller, provider);
        let store = FakeStore(Behavior::Rows(vec![cancelled]));

        let resolved = resolve_active_subscription(&store, caller, provider, DEADLINE)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_error_not_none() {
        let store = FakeStore(Behavior::Fail);
        let result = resolve_active_subscription(&store, Uuid::new_v4(), Uuid::new_v4(), DEADLINE).await;
        let err = result.unwrap_err();
        assert!(matches!(err, ResolutionError::Store(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_hung_store_times_out() {
        let store = FakeStore(Behavior::Hang);
        let result = resolve_active_subscription(&store, Uuid::new_v4(), Uuid::new_v4(), DEADLINE).await;
        assert!(matches!(result, Err(ResolutionError::Timeout(200))));
    }
}
