//! Database models
//!
//! Typed domain records. Raw rows are decoded into these at the query
//! boundary; a row with an unknown tier or status never becomes a model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tier::Tier;

/// Subscription lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Pending,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Pending => "pending",
        }
    }

    /// Parse a stored status. Accepts the payment processor's spellings
    /// (`canceled`, `incomplete`) that webhook sync writes back.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SubscriptionStatus::Active),
            "cancelled" | "canceled" => Some(SubscriptionStatus::Cancelled),
            "pending" | "incomplete" => Some(SubscriptionStatus::Pending),
            _ => None,
        }
    }
}

/// A caller's subscription at one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub caller_id: Uuid,
    pub provider_id: Uuid,
    pub package_id: Option<Uuid>,
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub period_start: DateTime<Utc>,
    pub period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

/// Fields required to create a subscription
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub caller_id: Uuid,
    pub provider_id: Uuid,
    pub package_id: Option<Uuid>,
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub period_start: DateTime<Utc>,
    pub period_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Document,
    Image,
    Text,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Document => "document",
            ContentType::Image => "image",
            ContentType::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(ContentType::Video),
            "document" => Some(ContentType::Document),
            "image" => Some(ContentType::Image),
            "text" => Some(ContentType::Text),
            _ => None,
        }
    }

    /// Default object storage bucket for uploads of this type
    pub fn default_bucket(self) -> String {
        format!("user-{}s", self.as_str())
    }
}

/// A provider-owned content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub package_id: Option<Uuid>,
    /// `None` means any active subscriber may view it
    pub required_tier: Option<Tier>,
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub is_published: bool,
    /// Absolute URL or `bucket/path` object key
    pub storage_ref: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContentItem {
    pub provider_id: Uuid,
    pub package_id: Option<Uuid>,
    pub required_tier: Option<Tier>,
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub is_published: bool,
    pub storage_ref: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// Content owner and subscription counterparty (coach or gym)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    /// Account that manages this provider's packages and content
    pub owner_id: Uuid,
    pub slug: String,
    pub display_name: String,
    pub brand_color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Month,
    Year,
    Once,
}

impl BillingInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
            BillingInterval::Once => "once",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(BillingInterval::Month),
            "year" => Some(BillingInterval::Year),
            "once" => Some(BillingInterval::Once),
            _ => None,
        }
    }
}

/// Priced bundle granting a tier at a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub tier: Tier,
    pub price_cents: i64,
    pub billing_interval: BillingInterval,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPackage {
    pub provider_id: Uuid,
    pub name: String,
    pub tier: Tier,
    pub price_cents: i64,
    pub billing_interval: BillingInterval,
    pub is_published: bool,
}

/// Editable package fields; publication is toggled separately
#[derive(Debug, Clone)]
pub struct PackageChanges {
    pub name: String,
    pub tier: Tier,
    pub price_cents: i64,
    pub billing_interval: BillingInterval,
}
