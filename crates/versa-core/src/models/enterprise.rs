//! Enterprise and agency-seat domain models.
//!
//! An enterprise is the tenant root: every identity context binds a user
//! into exactly one enterprise (directly, through an agency seat, or as
//! a partner acting on behalf of a client enterprise).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnterpriseKind {
    Pharma,
    Agency,
    Partner,
    Other,
}

/// Subscription tier, the second half of the rate-limit lookup key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Standard,
    Premium,
    Enterprise,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Standard => "standard",
            SubscriptionTier::Premium => "premium",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enterprise {
    pub id: Uuid,
    pub name: String,
    /// URL-safe unique identifier (e.g., `globalmed-pharma`).
    pub slug: String,
    pub kind: EnterpriseKind,
    pub subscription_tier: SubscriptionTier,
    /// Arbitrary key-value settings.
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEnterprise {
    pub name: String,
    pub slug: String,
    pub kind: EnterpriseKind,
    pub subscription_tier: Option<SubscriptionTier>,
    pub settings: Option<serde_json::Value>,
}

/// A named sub-division of an enterprise (e.g. a creative team).
///
/// Optional — a user context may reference an enterprise without a seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgencySeat {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub seat_kind: String,
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgencySeat {
    pub enterprise_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub seat_kind: Option<String>,
    pub settings: Option<serde_json::Value>,
}
