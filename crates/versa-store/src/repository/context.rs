//! In-memory implementation of [`ContextRepository`].

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use versa_core::error::{CoreError, CoreResult};
use versa_core::models::context::{
    ContextType, CreatePartnerClientContext, CreateUserContext, EnterpriseContextSummary,
    PartnerClientContext, PartnerContextSummary, ResolvedContext, UserContext,
};
use versa_core::models::relationship::RelationshipStatus;
use versa_core::repository::ContextRepository;

use crate::store::{MemoryStore, Tables};

fn enterprise_summary(
    tables: &Tables,
    context: &UserContext,
) -> CoreResult<EnterpriseContextSummary> {
    let enterprise = tables.enterprise(context.enterprise_id)?;
    Ok(EnterpriseContextSummary {
        context_id: context.id,
        context_type: context.context_type(),
        enterprise_id: enterprise.id,
        enterprise_name: enterprise.name.clone(),
        enterprise_kind: enterprise.kind,
        agency_seat_id: context.agency_seat_id,
        agency_seat_name: context.agency_seat_id.and_then(|id| tables.seat_name(id)),
        role: context.role.clone(),
        permissions: context.permissions.clone(),
        is_default: context.is_default,
        last_accessed: context.last_accessed,
    })
}

fn partner_summary(
    tables: &Tables,
    context: &PartnerClientContext,
) -> CoreResult<PartnerContextSummary> {
    let partner = tables.enterprise(context.partner_enterprise_id)?;
    let client = tables.enterprise(context.client_enterprise_id)?;
    let relationship =
        tables.relationship_for_pair(context.partner_enterprise_id, context.client_enterprise_id);
    Ok(PartnerContextSummary {
        context_id: context.id,
        partner_enterprise_id: partner.id,
        partner_enterprise_name: partner.name.clone(),
        client_enterprise_id: client.id,
        client_enterprise_name: client.name.clone(),
        role: context.role.clone(),
        permissions: context.permissions.clone(),
        is_default: context.is_default,
        last_accessed: context.last_accessed,
        relationship_status: relationship.map(|r| r.status),
        compliance_score: relationship.map(|r| r.compliance_score),
    })
}

impl ContextRepository for MemoryStore {
    async fn list_enterprise_contexts(
        &self,
        user_id: Uuid,
    ) -> CoreResult<Vec<EnterpriseContextSummary>> {
        let tables = self.tables.read().await;
        let mut rows = tables
            .user_contexts
            .values()
            .filter(|c| c.user_id == user_id && c.is_active)
            .map(|c| enterprise_summary(&tables, c))
            .collect::<CoreResult<Vec<_>>>()?;
        // Default first, then most recently accessed.
        rows.sort_by_key(|r| (u8::from(!r.is_default), std::cmp::Reverse(r.last_accessed)));
        Ok(rows)
    }

    async fn list_partner_contexts(
        &self,
        user_id: Uuid,
        partner_enterprise_id: Option<Uuid>,
    ) -> CoreResult<Vec<PartnerContextSummary>> {
        let tables = self.tables.read().await;
        let mut rows = tables
            .partner_contexts
            .values()
            .filter(|c| c.user_id == user_id && c.is_active)
            .filter(|c| {
                partner_enterprise_id.is_none_or(|id| c.partner_enterprise_id == id)
            })
            .map(|c| partner_summary(&tables, c))
            .collect::<CoreResult<Vec<_>>>()?;
        rows.sort_by_key(|r| (u8::from(!r.is_default), std::cmp::Reverse(r.last_accessed)));
        Ok(rows)
    }

    async fn get_default_context(&self, user_id: Uuid) -> CoreResult<ResolvedContext> {
        let tables = self.tables.read().await;
        let context = tables
            .user_contexts
            .values()
            .find(|c| c.user_id == user_id && c.is_active && c.is_default)
            .ok_or_else(|| CoreError::not_found("default context", user_id))?;
        tables.resolve_user_context(context)
    }

    async fn find_context(
        &self,
        user_id: Uuid,
        context_id: Uuid,
    ) -> CoreResult<Option<ResolvedContext>> {
        let tables = self.tables.read().await;

        if let Some(context) = tables.user_contexts.get(&context_id) {
            if context.user_id == user_id && context.is_active {
                return tables.resolve_user_context(context).map(Some);
            }
            return Ok(None);
        }

        if let Some(context) = tables.partner_contexts.get(&context_id) {
            if context.user_id == user_id && context.is_active {
                return tables.resolve_partner_context(context).map(Some);
            }
        }

        Ok(None)
    }

    async fn touch_last_accessed(&self, kind: ContextType, context_id: Uuid) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        match kind {
            ContextType::Enterprise | ContextType::AgencySeat => {
                let context = tables
                    .user_contexts
                    .get_mut(&context_id)
                    .ok_or_else(|| CoreError::not_found("user context", context_id))?;
                context.last_accessed = Some(now);
            }
            ContextType::Partner => {
                let context = tables
                    .partner_contexts
                    .get_mut(&context_id)
                    .ok_or_else(|| CoreError::not_found("partner context", context_id))?;
                context.last_accessed = Some(now);
            }
        }
        Ok(())
    }

    async fn create_user_context(&self, input: CreateUserContext) -> CoreResult<UserContext> {
        let mut tables = self.tables.write().await;

        tables.enterprise(input.enterprise_id)?;
        if let Some(seat_id) = input.agency_seat_id {
            if !tables.agency_seats.contains_key(&seat_id) {
                return Err(CoreError::not_found("agency seat", seat_id));
            }
        }

        if input.is_default {
            tables.demote_defaults(input.user_id);
        }

        let context = UserContext {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            enterprise_id: input.enterprise_id,
            agency_seat_id: input.agency_seat_id,
            role: input.role,
            permissions: input.permissions,
            is_default: input.is_default,
            is_active: true,
            last_accessed: None,
            created_at: Utc::now(),
        };
        tables.user_contexts.insert(context.id, context.clone());
        Ok(context)
    }

    async fn create_partner_context(
        &self,
        input: CreatePartnerClientContext,
    ) -> CoreResult<PartnerClientContext> {
        let mut tables = self.tables.write().await;

        // 1. The user must already belong to the partner enterprise.
        let is_member = tables.user_contexts.values().any(|c| {
            c.user_id == input.user_id
                && c.enterprise_id == input.partner_enterprise_id
                && c.is_active
        });
        if !is_member {
            return Err(CoreError::access_denied(
                "user holds no active context in the partner enterprise",
            ));
        }

        // 2. An active relationship must authorize the pair.
        let status = tables
            .relationship_for_pair(input.partner_enterprise_id, input.client_enterprise_id)
            .map(|r| r.status);
        match status {
            Some(RelationshipStatus::Active) => {}
            Some(status) => {
                return Err(CoreError::access_denied(format!(
                    "partner relationship is {status}, not active"
                )));
            }
            None => {
                return Err(CoreError::access_denied(
                    "no partner relationship exists for this client",
                ));
            }
        }

        // 3. One active binding per (user, partner, client).
        let duplicate = tables.partner_contexts.values().any(|c| {
            c.user_id == input.user_id
                && c.partner_enterprise_id == input.partner_enterprise_id
                && c.client_enterprise_id == input.client_enterprise_id
                && c.is_active
        });
        if duplicate {
            return Err(CoreError::AlreadyExists {
                entity: "partner context".into(),
            });
        }

        if input.is_default {
            tables.demote_defaults(input.user_id);
        }

        let context = PartnerClientContext {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            partner_enterprise_id: input.partner_enterprise_id,
            client_enterprise_id: input.client_enterprise_id,
            role: input.role,
            permissions: input.permissions,
            is_default: input.is_default,
            is_active: true,
            last_accessed: None,
            created_at: Utc::now(),
        };
        tables.partner_contexts.insert(context.id, context.clone());
        Ok(context)
    }

    async fn deactivate_partner_context(&self, user_id: Uuid, context_id: Uuid) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        let context = tables
            .partner_contexts
            .get_mut(&context_id)
            .ok_or_else(|| CoreError::not_found("partner context", context_id))?;
        if context.user_id != user_id {
            return Err(CoreError::access_denied(
                "partner context belongs to a different user",
            ));
        }
        context.is_active = false;
        context.is_default = false;
        Ok(())
    }

    async fn count_active_contexts(&self, user_id: Uuid) -> CoreResult<u64> {
        let tables = self.tables.read().await;
        let enterprise = tables
            .user_contexts
            .values()
            .filter(|c| c.user_id == user_id && c.is_active)
            .count();
        let partner = tables
            .partner_contexts
            .values()
            .filter(|c| c.user_id == user_id && c.is_active)
            .count();
        Ok((enterprise + partner) as u64)
    }

    async fn count_distinct_clients(
        &self,
        user_id: Uuid,
        partner_enterprise_id: Uuid,
    ) -> CoreResult<u64> {
        let tables = self.tables.read().await;
        let clients: HashSet<Uuid> = tables
            .partner_contexts
            .values()
            .filter(|c| {
                c.user_id == user_id
                    && c.partner_enterprise_id == partner_enterprise_id
                    && c.is_active
            })
            .map(|c| c.client_enterprise_id)
            .collect();
        Ok(clients.len() as u64)
    }
}
