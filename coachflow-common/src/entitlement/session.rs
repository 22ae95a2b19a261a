//! Member session
//!
//! Holds the caller, the provider being viewed, and the resolved subscription
//! for one view. The subscription only changes through the methods below, so
//! every entitlement check can see exactly which state it depends on.

use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use super::resolver::resolve_active_subscription;
use super::source::SubscriptionStore;
use super::with_deadline;
use crate::db::models::{NewSubscription, Subscription, SubscriptionStatus};
use crate::error::ResolutionError;
use crate::tier::Tier;
use crate::time::{now, period_end, DEMO_PERIOD_DAYS};
use crate::{Error, Result};

pub struct MemberSession<'a> {
    store: &'a dyn SubscriptionStore,
    caller_id: Uuid,
    provider_id: Uuid,
    deadline: Duration,
    subscription: Option<Subscription>,
}

impl<'a> MemberSession<'a> {
    /// Resolve the caller's subscription at `provider_id` and open a session
    pub async fn open(
        store: &'a dyn SubscriptionStore,
        caller_id: Uuid,
        provider_id: Uuid,
        deadline: Duration,
    ) -> std::result::Result<MemberSession<'a>, ResolutionError> {
        let subscription =
            resolve_active_subscription(store, caller_id, provider_id, deadline).await?;
        Ok(Self {
            store,
            caller_id,
            provider_id,
            deadline,
            subscription,
        })
    }

    pub fn caller_id(&self) -> Uuid {
        self.caller_id
    }

    pub fn provider_id(&self) -> Uuid {
        self.provider_id
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The active subscription, if any
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Re-resolve from the store, picking up changes made elsewhere
    pub async fn refresh(&mut self) -> std::result::Result<(), ResolutionError> {
        self.subscription = resolve_active_subscription(
            self.store,
            self.caller_id,
            self.provider_id,
            self.deadline,
        )
        .await?;
        Ok(())
    }

    /// Demo registration: create an active subscription for a 30-day period.
    ///
    /// Fails with [`Error::Conflict`] if the caller already has an active
    /// subscription at this provider.
    pub async fn register(&mut self, tier: Tier, package_id: Option<Uuid>) -> Result<&Subscription> {
        self.refresh().await?;
        if let Some(existing) = &self.subscription {
            return Err(Error::Conflict(format!(
                "caller {} already has an active {} subscription at provider {}",
                self.caller_id,
                existing.tier.as_str(),
                self.provider_id
            )));
        }

        let start = now();
        let created = with_deadline(
            self.deadline,
            self.store.create_subscription(NewSubscription {
                caller_id: self.caller_id,
                provider_id: self.provider_id,
                package_id,
                tier,
                status: SubscriptionStatus::Active,
                period_start: start,
                period_end: Some(period_end(start, DEMO_PERIOD_DAYS)),
            }),
            Error::Timeout,
        )
        .await?;

        info!(
            caller = %self.caller_id,
            provider = %self.provider_id,
            tier = tier.as_str(),
            "Registered subscription"
        );
        Ok(&*self.subscription.insert(created))
    }

    /// Cancel the active subscription. Rows are kept as `cancelled`.
    ///
    /// Every active row for (caller, provider) is cancelled, not only the one
    /// the resolver picked, so an older duplicate cannot take its place.
    pub async fn cancel(&mut self) -> Result<()> {
        let current = self.require_active()?;
        let active = with_deadline(
            self.deadline,
            self.store.active_subscriptions(self.caller_id, self.provider_id),
            ResolutionError::Timeout,
        )
        .await?;

        let mut ids: Vec<Uuid> = active.iter().filter(|s| s.is_active()).map(|s| s.id).collect();
        if !ids.contains(&current.id) {
            ids.push(current.id);
        }
        if ids.len() > 1 {
            warn!(
                caller = %self.caller_id,
                provider = %self.provider_id,
                count = ids.len(),
                "Cancelling duplicate active subscriptions"
            );
        }

        for id in &ids {
            with_deadline(
                self.deadline,
                self.store.set_status(*id, SubscriptionStatus::Cancelled),
                Error::Timeout,
            )
            .await?;
        }

        info!(
            caller = %self.caller_id,
            provider = %self.provider_id,
            subscription = %current.id,
            "Cancelled subscription"
        );
        self.subscription = None;
        Ok(())
    }

    /// Plan change on the active subscription (last write wins)
    pub async fn change_tier(&mut self, tier: Tier, package_id: Option<Uuid>) -> Result<&Subscription> {
        let current = self.require_active()?;
        with_deadline(
            self.deadline,
            self.store.set_tier(current.id, tier, package_id),
            Error::Timeout,
        )
        .await?;

        info!(
            caller = %self.caller_id,
            provider = %self.provider_id,
            from = current.tier.as_str(),
            to = tier.as_str(),
            "Changed subscription tier"
        );

        let mut updated = current;
        updated.tier = tier;
        updated.package_id = package_id;
        updated.updated_at = now();
        Ok(&*self.subscription.insert(updated))
    }

    fn require_active(&self) -> Result<Subscription> {
        self.subscription.clone().ok_or_else(|| {
            Error::NotFound(format!(
                "active subscription for caller {} at provider {}",
                self.caller_id, self.provider_id
            ))
        })
    }
}
