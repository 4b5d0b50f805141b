//! Permission domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known role names.
///
/// Roles are plain strings in storage and in token claims; these
/// constants name the ones the built-in access policy knows about.
pub mod roles {
    /// Granted everything, unconditionally.
    pub const PLATFORM_SUPER_ADMIN: &str = "platform_super_admin";
    pub const ENTERPRISE_OWNER: &str = "enterprise_owner";
    pub const ENTERPRISE_ADMIN: &str = "enterprise_admin";
    pub const SEAT_ADMIN: &str = "seat_admin";
    pub const SEAT_USER: &str = "seat_user";
    pub const PARTNER_ADMIN: &str = "partner_admin";
    pub const PARTNER_USER: &str = "partner_user";
    pub const ACCOUNT_MANAGER: &str = "account_manager";
    pub const PROJECT_MANAGER: &str = "project_manager";
    pub const COMPLIANCE_MANAGER: &str = "compliance_manager";
}

/// A single grant: `(resource, action)` with an optional resource-id
/// constraint.
///
/// `"*"` is accepted for `resource` and `action` and matches anything —
/// enterprise owners receive a single `*/*` grant at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    pub resource: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            resource_id: None,
        }
    }

    pub fn scoped(
        resource: impl Into<String>,
        action: impl Into<String>,
        resource_id: Uuid,
    ) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            resource_id: Some(resource_id),
        }
    }

    /// The full wildcard grant.
    pub fn all() -> Self {
        Self::new("*", "*")
    }

    /// Whether this grant authorizes `(resource, action, resource_id)`.
    ///
    /// A grant without a resource-id constraint matches any resource id;
    /// a constrained grant matches only its own.
    pub fn matches(&self, resource: &str, action: &str, resource_id: Option<Uuid>) -> bool {
        let resource_ok = self.resource == "*" || self.resource == resource;
        let action_ok = self.action == "*" || self.action == action;
        let id_ok = match self.resource_id {
            None => true,
            Some(constraint) => resource_id == Some(constraint),
        };
        resource_ok && action_ok && id_ok
    }
}

/// A permission statically granted to a role — rarely-mutated reference
/// data, resolved at check time when a token's explicit grants miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermission {
    pub role: String,
    pub resource: String,
    pub action: String,
    pub granted: bool,
}
