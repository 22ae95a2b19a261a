//! Tier registry
//!
//! Subscription tiers in ascending order of access: basic < premium < elite.
//! The enum is exhaustive, so an unrecognized label can only exist as a
//! parse failure ([`UnknownTierError`]), never as a value that compares
//! silently false.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownTierError;

/// Integer rank of a tier. Higher rank = more access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Rank(pub u8);

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Premium,
    Elite,
}

impl Tier {
    /// All tiers in declared order, lowest first
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Premium, Tier::Elite];

    pub fn rank(self) -> Rank {
        match self {
            Tier::Basic => Rank(1),
            Tier::Premium => Rank(2),
            Tier::Elite => Rank(3),
        }
    }

    /// Canonical storage label
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Premium => "premium",
            Tier::Elite => "elite",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tier::Basic => "Basic",
            Tier::Premium => "Premium",
            Tier::Elite => "Elite",
        }
    }

    /// True if a holder of `self` may access content requiring `required`
    pub fn covers(self, required: Tier) -> bool {
        self.rank() >= required.rank()
    }
}

impl FromStr for Tier {
    type Err = UnknownTierError;

    /// Parse a stored label. Case and surrounding whitespace are ignored.
    /// `pro` is the label older app versions wrote for premium.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Tier::Basic),
            "premium" | "pro" => Ok(Tier::Premium),
            "elite" => Ok(Tier::Elite),
            _ => Err(UnknownTierError {
                label: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
