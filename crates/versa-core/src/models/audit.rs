//! Audit trail domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known audit action names.
pub mod actions {
    pub const CONTEXT_SWITCH_SUCCESS: &str = "context_switch_success";
    pub const CONTEXT_SWITCH_FAILED: &str = "context_switch_failed";
    pub const SCREEN_ACCESS: &str = "screen_access";
    pub const CREATE_ENTERPRISE: &str = "create_enterprise";
    pub const CREATE_AGENCY_SEAT: &str = "create_agency_seat";
    pub const CREATE_PARTNER_CONTEXT: &str = "create_partner_context";
    pub const REMOVE_PARTNER_CONTEXT: &str = "remove_partner_context";
}

/// An immutable, append-only record of a context change or access
/// attempt. No update or delete operations exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub context_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEntry {
    pub user_id: Uuid,
    pub context_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub details: serde_json::Value,
}
