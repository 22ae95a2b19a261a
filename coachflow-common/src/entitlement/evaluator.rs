//! Entitlement evaluator
//!
//! Single source of truth for "can this caller view this item now".

use crate::db::models::{ContentItem, Subscription};

/// Decide whether `item` is accessible under `subscription`.
///
/// - No subscription, or a subscription that is not `active`: denied, even
///   for items without a required tier.
/// - Unpublished items: denied.
/// - Item without a required tier: allowed for any active subscriber.
/// - Otherwise: allowed iff the subscription tier ranks at or above the
///   item's required tier.
///
/// Pure: no I/O, same inputs give the same answer.
pub fn is_accessible(item: &ContentItem, subscription: Option<&Subscription>) -> bool {
    let Some(subscription) = subscription else {
        return false;
    };
    if !subscription.is_active() || !item.is_published {
        return false;
    }

    match item.required_tier {
        None => true,
        Some(required) => subscription.tier.covers(required),
    }
}
