//! Partner-enterprise relationship domain model.
//!
//! A relationship is a directed, status-bearing edge authorizing one
//! enterprise (the partner) to act on behalf of another (the client).
//! Partner-client contexts are only valid while the underlying
//! relationship is `Active` — the edge can lapse after a context was
//! created, and every access path re-validates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    Pending,
    Active,
    Suspended,
    Ended,
}

impl RelationshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Active => "active",
            RelationshipStatus::Suspended => "suspended",
            RelationshipStatus::Ended => "ended",
        }
    }
}

impl std::fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerRelationship {
    pub id: Uuid,
    pub partner_enterprise_id: Uuid,
    pub client_enterprise_id: Uuid,
    pub status: RelationshipStatus,
    /// Kind of engagement (e.g., `agency`).
    pub relationship_kind: String,
    pub compliance_score: f64,
    pub risk_level: RiskLevel,
    pub settings: serde_json::Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePartnerRelationship {
    pub partner_enterprise_id: Uuid,
    pub client_enterprise_id: Uuid,
    pub status: Option<RelationshipStatus>,
    pub relationship_kind: Option<String>,
    pub compliance_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub settings: Option<serde_json::Value>,
    pub created_by: Uuid,
}
