//! Render gate
//!
//! Turns an evaluator verdict into one of two presentations. The gate never
//! looks at the subscription; the verdict is the only input that decides
//! locked vs unlocked.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{BillingInterval, ContentItem, Package};
use crate::storage::{ObjectStorage, StorageRef};
use crate::tier::Tier;

/// How one catalog item is shown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Presentation {
    Unlocked {
        open_url: String,
        download_url: String,
    },
    Locked {
        upgrade: UpgradePrompt,
    },
}

impl Presentation {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Presentation::Unlocked { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradePrompt {
    /// Tier the item asks for; `None` when any subscription would do
    pub required_tier: Option<Tier>,
    pub message: String,
    /// Cheapest published package that would unlock the item
    pub offer: Option<PackageOffer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageOffer {
    pub package_id: Uuid,
    pub name: String,
    pub tier: Tier,
    pub price_cents: i64,
    pub billing_interval: BillingInterval,
}

impl From<&Package> for PackageOffer {
    fn from(package: &Package) -> Self {
        Self {
            package_id: package.id,
            name: package.name.clone(),
            tier: package.tier,
            price_cents: package.price_cents,
            billing_interval: package.billing_interval,
        }
    }
}

/// Choose the presentation for `item` given the evaluator's `verdict`.
///
/// `offers` are the provider's published packages; the cheapest one whose
/// tier covers the item becomes the upgrade offer.
pub fn render(
    item: &ContentItem,
    verdict: bool,
    storage: &ObjectStorage,
    offers: &[Package],
    now: DateTime<Utc>,
) -> Presentation {
    if verdict {
        let reference = StorageRef::for_item(item);
        let open_url = storage.open_url(&reference, now);
        let download_url = match reference {
            StorageRef::Url { .. } => open_url.clone(),
            StorageRef::Object { .. } if open_url.contains('?') => format!("{}&download=1", open_url),
            StorageRef::Object { .. } => format!("{}?download=1", open_url),
        };
        return Presentation::Unlocked {
            open_url,
            download_url,
        };
    }

    let required_tier = item.required_tier;
    let offer = offers
        .iter()
        .filter(|p| p.is_published)
        .filter(|p| required_tier.map_or(true, |required| p.tier.covers(required)))
        .min_by_key(|p| p.price_cents)
        .map(PackageOffer::from);

    let message = match required_tier {
        Some(tier) => format!("Upgrade to {} to unlock this content", tier),
        None => "Subscribe to unlock this content".to_string(),
    };

    Presentation::Locked {
        upgrade: UpgradePrompt {
            required_tier,
            message,
            offer,
        },
    }
}
