//! The shared table set and join helpers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use versa_core::error::{CoreError, CoreResult};
use versa_core::models::audit::AuditEntry;
use versa_core::models::context::{PartnerClientContext, ResolvedContext, UserContext};
use versa_core::models::enterprise::{AgencySeat, Enterprise};
use versa_core::models::permission::RolePermission;
use versa_core::models::relationship::PartnerRelationship;
use versa_core::models::user::User;

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub users: HashMap<Uuid, User>,
    pub enterprises: HashMap<Uuid, Enterprise>,
    pub agency_seats: HashMap<Uuid, AgencySeat>,
    pub user_contexts: HashMap<Uuid, UserContext>,
    pub partner_contexts: HashMap<Uuid, PartnerClientContext>,
    pub relationships: HashMap<Uuid, PartnerRelationship>,
    pub role_permissions: Vec<RolePermission>,
    pub audit_log: Vec<AuditEntry>,
}

impl Tables {
    pub fn enterprise(&self, id: Uuid) -> CoreResult<&Enterprise> {
        self.enterprises
            .get(&id)
            .ok_or_else(|| CoreError::not_found("enterprise", id))
    }

    pub fn seat_name(&self, id: Uuid) -> Option<String> {
        self.agency_seats.get(&id).map(|seat| seat.name.clone())
    }

    /// Join a user context with its enterprise and seat names.
    pub fn resolve_user_context(&self, context: &UserContext) -> CoreResult<ResolvedContext> {
        let enterprise = self.enterprise(context.enterprise_id)?;
        Ok(ResolvedContext::Enterprise {
            context: context.clone(),
            enterprise_name: enterprise.name.clone(),
            enterprise_kind: enterprise.kind,
            agency_seat_name: context.agency_seat_id.and_then(|id| self.seat_name(id)),
        })
    }

    /// Join a partner context with both enterprise names and the live
    /// relationship row (left join: a missing row resolves to `None`).
    pub fn resolve_partner_context(
        &self,
        context: &PartnerClientContext,
    ) -> CoreResult<ResolvedContext> {
        let partner = self.enterprise(context.partner_enterprise_id)?;
        let client = self.enterprise(context.client_enterprise_id)?;
        let relationship = self.relationship_for_pair(
            context.partner_enterprise_id,
            context.client_enterprise_id,
        );
        Ok(ResolvedContext::Partner {
            context: context.clone(),
            partner_enterprise_name: partner.name.clone(),
            client_enterprise_name: client.name.clone(),
            relationship_status: relationship.map(|r| r.status),
            compliance_score: relationship.map(|r| r.compliance_score),
        })
    }

    pub fn relationship_for_pair(
        &self,
        partner_enterprise_id: Uuid,
        client_enterprise_id: Uuid,
    ) -> Option<&PartnerRelationship> {
        self.relationships.values().find(|r| {
            r.partner_enterprise_id == partner_enterprise_id
                && r.client_enterprise_id == client_enterprise_id
        })
    }

    /// Demote any active default context the user holds, in either
    /// table. Called before inserting a new default so the
    /// at-most-one-default invariant holds at every commit point.
    pub fn demote_defaults(&mut self, user_id: Uuid) {
        for context in self.user_contexts.values_mut() {
            if context.user_id == user_id && context.is_default {
                context.is_default = false;
            }
        }
        for context in self.partner_contexts.values_mut() {
            if context.user_id == user_id && context.is_default {
                context.is_default = false;
            }
        }
    }
}

/// In-memory store. Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub(crate) tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}
