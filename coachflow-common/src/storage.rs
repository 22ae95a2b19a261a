//! Object storage URL construction
//!
//! Content bytes live in hosted object storage; this module only builds the
//! URLs a member's client uses to open or download an item.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::db::models::{ContentItem, ContentType};

/// Where a content item's bytes live
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageRef {
    /// Externally hosted file, used as-is
    Url { url: String },
    /// Object in one of our buckets
    Object { bucket: String, path: String },
}

impl StorageRef {
    /// Interpret a stored reference for an item of `content_type`.
    ///
    /// Absolute `http(s)://` references are kept verbatim. Anything else is a
    /// path inside the content type's upload bucket (`user-videos`, ...).
    pub fn parse(raw: &str, content_type: ContentType) -> Self {
        let raw = raw.trim();
        if raw.starts_with("https://") || raw.starts_with("http://") {
            StorageRef::Url {
                url: raw.to_string(),
            }
        } else {
            StorageRef::Object {
                bucket: content_type.default_bucket(),
                path: raw.trim_start_matches('/').to_string(),
            }
        }
    }

    pub fn for_item(item: &ContentItem) -> Self {
        Self::parse(&item.storage_ref, item.content_type)
    }
}

/// Object storage endpoint and URL signing key
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    base_url: String,
    signing_secret: String,
    signed_url_ttl: Duration,
    public_buckets: Vec<String>,
}

impl ObjectStorage {
    pub fn new(base_url: &str, signing_secret: &str, signed_url_ttl: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            signing_secret: signing_secret.to_string(),
            signed_url_ttl,
            public_buckets: Vec::new(),
        }
    }

    /// Buckets served without signing
    pub fn with_public_buckets(mut self, buckets: Vec<String>) -> Self {
        self.public_buckets = buckets;
        self
    }

    pub fn is_public(&self, bucket: &str) -> bool {
        self.public_buckets.iter().any(|b| b == bucket)
    }

    /// URL a member's client opens: public for public buckets, signed with
    /// the configured TTL otherwise
    pub fn open_url(&self, reference: &StorageRef, now: DateTime<Utc>) -> String {
        match reference {
            StorageRef::Object { bucket, .. } if self.is_public(bucket) => self.public_url(reference),
            _ => self.signed_url(reference, self.signed_url_ttl, now),
        }
    }

    /// Unauthenticated URL for public buckets
    pub fn public_url(&self, reference: &StorageRef) -> String {
        match reference {
            StorageRef::Url { url } => url.clone(),
            StorageRef::Object { bucket, path } => {
                format!("{}/object/public/{}/{}", self.base_url, bucket, path)
            }
        }
    }

    /// Time-limited URL, valid until `now + ttl`
    pub fn signed_url(&self, reference: &StorageRef, ttl: Duration, now: DateTime<Utc>) -> String {
        match reference {
            StorageRef::Url { url } => url.clone(),
            StorageRef::Object { bucket, path } => {
                let expires = now.timestamp() + ttl.as_secs() as i64;
                let token = self.sign(bucket, path, expires);
                format!(
                    "{}/object/sign/{}/{}?expires={}&token={}",
                    self.base_url, bucket, path, expires, token
                )
            }
        }
    }

    fn sign(&self, bucket: &str, path: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}/{}:{}:{}", bucket, path, expires, self.signing_secret).as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
