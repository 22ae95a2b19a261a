//! Builders for entitlement unit tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::db::models::{ContentItem, ContentType, Subscription, SubscriptionStatus};
use crate::tier::Tier;

pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
}

pub fn subscription(tier: Tier, status: SubscriptionStatus) -> Subscription {
    Subscription {
        id: Uuid::new_v4(),
        caller_id: Uuid::new_v4(),
        provider_id: Uuid::new_v4(),
        package_id: None,
        tier,
        status,
        period_start: at(0),
        period_end: None,
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn item(n: u128, required_tier: Option<Tier>) -> ContentItem {
    ContentItem {
        id: Uuid::from_u128(n),
        provider_id: Uuid::from_u128(0xC0AC),
        package_id: None,
        required_tier,
        title: format!("Item {}", n),
        description: None,
        content_type: ContentType::Video,
        is_published: true,
        storage_ref: format!("coach/item-{}.mp4", n),
        sort_order: 0,
        created_at: at(n as i64),
    }
}

/// Catalog from the premium-caller scenario: basic, premium, elite, none
pub fn scenario_catalog() -> Vec<ContentItem> {
    vec![
        item(1, Some(Tier::Basic)),
        item(2, Some(Tier::Premium)),
        item(3, Some(Tier::Elite)),
        item(4, None),
    ]
}
