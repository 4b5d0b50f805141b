//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The durable store behind these
//! traits is an external collaborator; the core only defines the query
//! contracts. Compound operations (enterprise + owner context, seat +
//! admin context, create/deactivate partner context) are single methods
//! so a backend can execute them inside one transaction — any failure
//! after partial writes must roll back the whole operation.

use uuid::Uuid;

use crate::error::CoreResult;
use crate::models::{
    audit::{AuditEntry, CreateAuditEntry},
    context::{
        AvailableContexts, ContextType, CreatePartnerClientContext, CreateUserContext,
        EnterpriseContextSummary, PartnerClientContext, PartnerContextSummary, ResolvedContext,
        UserContext,
    },
    enterprise::{AgencySeat, CreateAgencySeat, CreateEnterprise, Enterprise},
    permission::Permission,
    relationship::{CreatePartnerRelationship, PartnerRelationship, RelationshipStatus},
    user::{CreateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = CoreResult<User>> + Send;
    /// Soft-delete: clears `is_active`.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
}

pub trait EnterpriseRepository: Send + Sync {
    /// Creates the enterprise and the owner's default full-permission
    /// context in one transaction.
    fn create(
        &self,
        input: CreateEnterprise,
        owner_user_id: Uuid,
    ) -> impl Future<Output = CoreResult<Enterprise>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<Enterprise>> + Send;

    /// Creates the seat and the creator's seat-admin context in one
    /// transaction.
    fn create_seat(
        &self,
        input: CreateAgencySeat,
        created_by: Uuid,
    ) -> impl Future<Output = CoreResult<AgencySeat>> + Send;
}

pub trait ContextRepository: Send + Sync {
    /// Active enterprise/seat contexts for a user, joined with
    /// enterprise and seat names. Default first, then most recently
    /// accessed.
    fn list_enterprise_contexts(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = CoreResult<Vec<EnterpriseContextSummary>>> + Send;

    /// Active partner-client contexts for a user, joined with both
    /// enterprise names and the live relationship status. Optionally
    /// restricted to one partner enterprise.
    fn list_partner_contexts(
        &self,
        user_id: Uuid,
        partner_enterprise_id: Option<Uuid>,
    ) -> impl Future<Output = CoreResult<Vec<PartnerContextSummary>>> + Send;

    /// The user's `is_default` active context. Every user must hold
    /// exactly one; `NotFound` signals a data-integrity violation.
    fn get_default_context(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = CoreResult<ResolvedContext>> + Send;

    /// Resolve one context by id, in one query across both context
    /// kinds. Ownership and `is_active` are filtered here: `None` means
    /// "no such active context for this user", with no hint of which
    /// table missed.
    fn find_context(
        &self,
        user_id: Uuid,
        context_id: Uuid,
    ) -> impl Future<Output = CoreResult<Option<ResolvedContext>>> + Send;

    /// Best-effort `last_accessed = now()` bump.
    fn touch_last_accessed(
        &self,
        kind: ContextType,
        context_id: Uuid,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    /// Insert a user context. When `is_default` is set, the previous
    /// default is demoted in the same transaction, preserving the
    /// at-most-one-default invariant.
    fn create_user_context(
        &self,
        input: CreateUserContext,
    ) -> impl Future<Output = CoreResult<UserContext>> + Send;

    /// Insert a partner-client context. In one transaction: verify the
    /// user holds an active context in the partner enterprise, verify
    /// an `Active` relationship exists for the pair, reject a duplicate
    /// active binding, insert.
    fn create_partner_context(
        &self,
        input: CreatePartnerClientContext,
    ) -> impl Future<Output = CoreResult<PartnerClientContext>> + Send;

    /// Ownership check + soft-delete in one transaction.
    fn deactivate_partner_context(
        &self,
        user_id: Uuid,
        context_id: Uuid,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    /// Count of all active contexts (both kinds) a user holds.
    fn count_active_contexts(&self, user_id: Uuid)
    -> impl Future<Output = CoreResult<u64>> + Send;

    /// Count of distinct client enterprises a user can act for within
    /// one partner enterprise.
    fn count_distinct_clients(
        &self,
        user_id: Uuid,
        partner_enterprise_id: Uuid,
    ) -> impl Future<Output = CoreResult<u64>> + Send;
}

pub trait RelationshipRepository: Send + Sync {
    /// Rejects partner == client and duplicate ordered pairs.
    fn create(
        &self,
        input: CreatePartnerRelationship,
    ) -> impl Future<Output = CoreResult<PartnerRelationship>> + Send;

    fn get_by_id(&self, id: Uuid)
    -> impl Future<Output = CoreResult<PartnerRelationship>> + Send;

    /// The at-most-one row for an ordered (partner, client) pair.
    fn get_pair(
        &self,
        partner_enterprise_id: Uuid,
        client_enterprise_id: Uuid,
    ) -> impl Future<Output = CoreResult<Option<PartnerRelationship>>> + Send;

    fn set_status(
        &self,
        id: Uuid,
        status: RelationshipStatus,
    ) -> impl Future<Output = CoreResult<PartnerRelationship>> + Send;

    fn list_clients(
        &self,
        partner_enterprise_id: Uuid,
        status: RelationshipStatus,
    ) -> impl Future<Output = CoreResult<Vec<PartnerRelationship>>> + Send;

    fn list_partners(
        &self,
        client_enterprise_id: Uuid,
        status: RelationshipStatus,
    ) -> impl Future<Output = CoreResult<Vec<PartnerRelationship>>> + Send;
}

/// Role→permission reference data. Rarely mutated; the resolver caches
/// rows per role and must be told when a mutation happens.
pub trait RolePermissionRepository: Send + Sync {
    fn permissions_for_role(
        &self,
        role: &str,
    ) -> impl Future<Output = CoreResult<Vec<Permission>>> + Send;

    fn grant(
        &self,
        role: &str,
        resource: &str,
        action: &str,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    fn revoke(
        &self,
        role: &str,
        resource: &str,
        action: &str,
    ) -> impl Future<Output = CoreResult<()>> + Send;
}

/// Query filters for the audit log read contract.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub user_id: Option<Uuid>,
    pub context_id: Option<Uuid>,
}

pub trait AuditLogRepository: Send + Sync {
    /// Append a new audit entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreateAuditEntry,
    ) -> impl Future<Output = CoreResult<AuditEntry>> + Send;

    /// Entries matching the filter, ordered by timestamp ascending.
    fn list(
        &self,
        filter: AuditFilter,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<Vec<AuditEntry>>> + Send;
}

/// Convenience: assemble a grouped context listing from the two list
/// queries. `has_multiple` counts every listed context, switchable or
/// not.
pub fn group_contexts(
    enterprise: Vec<EnterpriseContextSummary>,
    partner: Vec<PartnerContextSummary>,
) -> AvailableContexts {
    let has_multiple = enterprise.len() + partner.len() > 1;
    AvailableContexts {
        enterprise,
        partner,
        has_multiple,
    }
}
