//! Identity context domain models.
//!
//! A context is the single identity a token represents: membership in
//! an enterprise, a seat inside an enterprise's agency division, or a
//! partner organization acting on behalf of a client enterprise. A user
//! may hold many active contexts but acts through exactly one at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enterprise::EnterpriseKind;
use super::permission::Permission;
use super::relationship::RelationshipStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    Enterprise,
    AgencySeat,
    Partner,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::Enterprise => "enterprise",
            ContextType::AgencySeat => "agency_seat",
            ContextType::Partner => "partner",
        }
    }

    /// The budget scope this context type draws from. Agency seats
    /// spend their owning enterprise's budget.
    pub fn rate_scope(&self) -> &'static str {
        match self {
            ContextType::Enterprise | ContextType::AgencySeat => "enterprise",
            ContextType::Partner => "partner",
        }
    }
}

impl std::fmt::Display for ContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's membership in an enterprise, optionally through an agency
/// seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub id: Uuid,
    pub user_id: Uuid,
    pub enterprise_id: Uuid,
    pub agency_seat_id: Option<Uuid>,
    pub role: String,
    /// Explicit grants carried by this binding, on top of whatever the
    /// role statically grants.
    pub permissions: Vec<Permission>,
    pub is_default: bool,
    pub is_active: bool,
    pub last_accessed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserContext {
    pub fn context_type(&self) -> ContextType {
        if self.agency_seat_id.is_some() {
            ContextType::AgencySeat
        } else {
            ContextType::Enterprise
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserContext {
    pub user_id: Uuid,
    pub enterprise_id: Uuid,
    pub agency_seat_id: Option<Uuid>,
    pub role: String,
    pub permissions: Vec<Permission>,
    pub is_default: bool,
}

/// A user's binding into a partner relationship: acting for
/// `partner_enterprise_id` on behalf of `client_enterprise_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerClientContext {
    pub id: Uuid,
    pub user_id: Uuid,
    pub partner_enterprise_id: Uuid,
    pub client_enterprise_id: Uuid,
    pub role: String,
    pub permissions: Vec<Permission>,
    pub is_default: bool,
    /// Soft-deleted via this flag, never removed, to preserve audit
    /// continuity.
    pub is_active: bool,
    pub last_accessed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePartnerClientContext {
    pub user_id: Uuid,
    pub partner_enterprise_id: Uuid,
    pub client_enterprise_id: Uuid,
    pub role: String,
    pub permissions: Vec<Permission>,
    pub is_default: bool,
}

/// A context resolved by the store, tagged by kind and joined with the
/// display data and relationship state access decisions need.
///
/// Replaces the "first try user contexts, then try partner contexts"
/// double lookup: the store answers once, and callers match
/// exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedContext {
    Enterprise {
        context: UserContext,
        enterprise_name: String,
        enterprise_kind: EnterpriseKind,
        agency_seat_name: Option<String>,
    },
    Partner {
        context: PartnerClientContext,
        partner_enterprise_name: String,
        client_enterprise_name: String,
        /// `None` when the relationship row is missing entirely.
        relationship_status: Option<RelationshipStatus>,
        compliance_score: Option<f64>,
    },
}

impl ResolvedContext {
    pub fn context_id(&self) -> Uuid {
        match self {
            ResolvedContext::Enterprise { context, .. } => context.id,
            ResolvedContext::Partner { context, .. } => context.id,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            ResolvedContext::Enterprise { context, .. } => context.user_id,
            ResolvedContext::Partner { context, .. } => context.user_id,
        }
    }

    pub fn context_type(&self) -> ContextType {
        match self {
            ResolvedContext::Enterprise { context, .. } => context.context_type(),
            ResolvedContext::Partner { .. } => ContextType::Partner,
        }
    }

    /// The enterprise the context acts *in*. For partner contexts this
    /// is the client enterprise — the tenant whose data is touched and
    /// whose budget is spent.
    pub fn acting_enterprise_id(&self) -> Uuid {
        match self {
            ResolvedContext::Enterprise { context, .. } => context.enterprise_id,
            ResolvedContext::Partner { context, .. } => context.client_enterprise_id,
        }
    }

    pub fn role(&self) -> &str {
        match self {
            ResolvedContext::Enterprise { context, .. } => &context.role,
            ResolvedContext::Partner { context, .. } => &context.role,
        }
    }

    pub fn permissions(&self) -> &[Permission] {
        match self {
            ResolvedContext::Enterprise { context, .. } => &context.permissions,
            ResolvedContext::Partner { context, .. } => &context.permissions,
        }
    }
}

/// One row of the enterprise side of a context listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnterpriseContextSummary {
    pub context_id: Uuid,
    pub context_type: ContextType,
    pub enterprise_id: Uuid,
    pub enterprise_name: String,
    pub enterprise_kind: EnterpriseKind,
    pub agency_seat_id: Option<Uuid>,
    pub agency_seat_name: Option<String>,
    pub role: String,
    pub permissions: Vec<Permission>,
    pub is_default: bool,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// One row of the partner side of a context listing.
///
/// A non-`Active` relationship status marks the row non-switchable; it
/// is still listed so the caller can show why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerContextSummary {
    pub context_id: Uuid,
    pub partner_enterprise_id: Uuid,
    pub partner_enterprise_name: String,
    pub client_enterprise_id: Uuid,
    pub client_enterprise_name: String,
    pub role: String,
    pub permissions: Vec<Permission>,
    pub is_default: bool,
    pub last_accessed: Option<DateTime<Utc>>,
    pub relationship_status: Option<RelationshipStatus>,
    pub compliance_score: Option<f64>,
}

/// Everything a user can act as, grouped by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableContexts {
    pub enterprise: Vec<EnterpriseContextSummary>,
    pub partner: Vec<PartnerContextSummary>,
    pub has_multiple: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_binding_is_agency_seat_type() {
        let mut ctx = UserContext {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            enterprise_id: Uuid::new_v4(),
            agency_seat_id: None,
            role: "enterprise_admin".into(),
            permissions: vec![],
            is_default: true,
            is_active: true,
            last_accessed: None,
            created_at: Utc::now(),
        };
        assert_eq!(ctx.context_type(), ContextType::Enterprise);

        ctx.agency_seat_id = Some(Uuid::new_v4());
        assert_eq!(ctx.context_type(), ContextType::AgencySeat);
    }

    #[test]
    fn partner_context_acts_in_client_enterprise() {
        let client = Uuid::new_v4();
        let resolved = ResolvedContext::Partner {
            context: PartnerClientContext {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                partner_enterprise_id: Uuid::new_v4(),
                client_enterprise_id: client,
                role: "partner_admin".into(),
                permissions: vec![],
                is_default: false,
                is_active: true,
                last_accessed: None,
                created_at: Utc::now(),
            },
            partner_enterprise_name: "Partner".into(),
            client_enterprise_name: "Client".into(),
            relationship_status: Some(RelationshipStatus::Active),
            compliance_score: Some(0.9),
        };
        assert_eq!(resolved.acting_enterprise_id(), client);
        assert_eq!(resolved.context_type(), ContextType::Partner);
    }
}
