//! Context resolution and switching — the core state transition.
//!
//! Generic over repository implementations so this layer has no
//! dependency on the store crate.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use versa_cache::{keys, CacheBackend};
use versa_core::error::{CoreError, CoreResult};
use versa_core::models::audit::{actions, CreateAuditEntry};
use versa_core::models::context::{
    AvailableContexts, ContextType, CreatePartnerClientContext, PartnerClientContext,
    ResolvedContext,
};
use versa_core::models::relationship::RelationshipStatus;
use versa_core::models::user::User;
use versa_core::repository::{group_contexts, ContextRepository, UserRepository};

use crate::audit::AuditRecorder;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token;

/// Context listings are cached per user for five minutes and
/// invalidated on every mutation touching that user's contexts.
const CONTEXT_LIST_TTL: Duration = Duration::from_secs(300);

/// Result of authentication: the user, everything they can act as, and
/// a token for their default context.
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub contexts: AvailableContexts,
    pub context: ResolvedContext,
    pub token: String,
}

/// Result of a context switch.
#[derive(Debug, Serialize)]
pub struct SwitchOutcome {
    pub context: ResolvedContext,
    pub token: String,
}

pub struct ContextService<U, C>
where
    U: UserRepository,
    C: ContextRepository,
{
    users: U,
    contexts: C,
    cache: Arc<dyn CacheBackend>,
    config: AuthConfig,
    audit: AuditRecorder,
}

impl<U, C> ContextService<U, C>
where
    U: UserRepository,
    C: ContextRepository,
{
    pub fn new(
        users: U,
        contexts: C,
        cache: Arc<dyn CacheBackend>,
        config: AuthConfig,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            users,
            contexts,
            cache,
            config,
            audit,
        }
    }

    /// Establish a session for a pre-verified identity.
    ///
    /// Credential verification happens upstream (an IdP fronting this
    /// core); this path enforces user existence, the active flag, and
    /// the default-context integrity precondition, then mints a token
    /// for the default context.
    pub async fn authenticate(&self, email: &str) -> CoreResult<AuthSession> {
        let user = self.users.get_by_email(email).await?;
        if !user.is_active {
            return Err(AuthError::UserInactive.into());
        }

        let context = self.contexts.get_default_context(user.id).await?;
        let contexts = self.list_contexts(user.id).await?;
        let token = token::mint(&context, &self.config)?;

        Ok(AuthSession {
            user,
            contexts,
            context,
            token,
        })
    }

    /// Everything the user can act as, grouped by kind. Cached per
    /// user; cache faults degrade to the store.
    pub async fn list_contexts(&self, user_id: Uuid) -> CoreResult<AvailableContexts> {
        let key = keys::user_contexts(user_id);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(cached) => return Ok(cached),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding malformed cache entry");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "context list cache read failed");
            }
        }

        let enterprise = self.contexts.list_enterprise_contexts(user_id).await?;
        let partner = self.contexts.list_partner_contexts(user_id, None).await?;
        let grouped = group_contexts(enterprise, partner);

        match serde_json::to_string(&grouped) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(&key, &raw, Some(CONTEXT_LIST_TTL)).await {
                    tracing::warn!(key = %key, error = %e, "context list cache write failed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "context list serialization failed");
            }
        }

        Ok(grouped)
    }

    /// The user's default context. `NotFound` here is a data-integrity
    /// violation — every user must hold one from creation time.
    pub async fn get_default_context(&self, user_id: Uuid) -> CoreResult<ResolvedContext> {
        self.contexts.get_default_context(user_id).await
    }

    /// Switch the user's active context and re-mint their token.
    ///
    /// `target_type` is advisory — the lookup is by id across both
    /// context kinds; the hint is recorded in the audit trail.
    pub async fn switch_context(
        &self,
        user_id: Uuid,
        target_context_id: Uuid,
        target_type: Option<ContextType>,
    ) -> CoreResult<SwitchOutcome> {
        let result = self.try_switch(user_id, target_context_id).await;

        match &result {
            Ok(outcome) => {
                self.audit.record(CreateAuditEntry {
                    user_id,
                    context_id: Some(target_context_id),
                    action: actions::CONTEXT_SWITCH_SUCCESS.into(),
                    resource_type: "context".into(),
                    resource_id: Some(target_context_id),
                    details: serde_json::json!({
                        "context_type": outcome.context.context_type(),
                        "target_type": target_type,
                    }),
                });
            }
            Err(e) => {
                self.audit.record(CreateAuditEntry {
                    user_id,
                    context_id: Some(target_context_id),
                    action: actions::CONTEXT_SWITCH_FAILED.into(),
                    resource_type: "context".into(),
                    resource_id: Some(target_context_id),
                    details: serde_json::json!({
                        "error": e.to_string(),
                        "target_type": target_type,
                    }),
                });
            }
        }

        result
    }

    async fn try_switch(
        &self,
        user_id: Uuid,
        target_context_id: Uuid,
    ) -> CoreResult<SwitchOutcome> {
        // 1. One lookup across both context kinds. Absent, foreign, and
        //    inactive all collapse into the same denial.
        let context = self
            .contexts
            .find_context(user_id, target_context_id)
            .await?
            .ok_or_else(|| CoreError::from(AuthError::ContextDenied))?;

        // 2. A partner context is only as good as its relationship —
        //    the edge can lapse between creation and switch time.
        if let ResolvedContext::Partner {
            relationship_status,
            ..
        } = &context
        {
            match relationship_status {
                Some(RelationshipStatus::Active) => {}
                Some(status) => {
                    return Err(CoreError::access_denied(format!(
                        "partner relationship is {status}, not active"
                    )));
                }
                None => {
                    return Err(CoreError::access_denied(
                        "partner relationship no longer exists",
                    ));
                }
            }
        }

        // 3. Best-effort recency bump; never blocks the switch.
        if let Err(e) = self
            .contexts
            .touch_last_accessed(context.context_type(), target_context_id)
            .await
        {
            tracing::warn!(context_id = %target_context_id, error = %e, "last_accessed update failed");
        }

        // 4. Invalidate the user's context listing, after the mutation.
        self.invalidate_context_list(user_id).await;

        // 5. Fresh token for the new context.
        let token = token::mint(&context, &self.config)?;

        Ok(SwitchOutcome { context, token })
    }

    /// Create a partner-client context. The store validates membership
    /// and the relationship inside one transaction.
    pub async fn create_partner_context(
        &self,
        input: CreatePartnerClientContext,
    ) -> CoreResult<PartnerClientContext> {
        let user_id = input.user_id;
        let context = self.contexts.create_partner_context(input).await?;

        self.invalidate_context_list(user_id).await;
        self.audit.record(CreateAuditEntry {
            user_id,
            context_id: Some(context.id),
            action: actions::CREATE_PARTNER_CONTEXT.into(),
            resource_type: "partner_context".into(),
            resource_id: Some(context.id),
            details: serde_json::json!({
                "partner_enterprise_id": context.partner_enterprise_id,
                "client_enterprise_id": context.client_enterprise_id,
                "role": context.role,
            }),
        });

        Ok(context)
    }

    /// Soft-remove a partner-client context the user owns.
    pub async fn remove_partner_context(
        &self,
        user_id: Uuid,
        context_id: Uuid,
    ) -> CoreResult<()> {
        self.contexts
            .deactivate_partner_context(user_id, context_id)
            .await?;

        self.invalidate_context_list(user_id).await;
        self.audit.record(CreateAuditEntry {
            user_id,
            context_id: Some(context_id),
            action: actions::REMOVE_PARTNER_CONTEXT.into(),
            resource_type: "partner_context".into(),
            resource_id: Some(context_id),
            details: serde_json::json!({}),
        });

        Ok(())
    }

    /// Drop the cached listing. A failed delete is logged, not raised —
    /// the entry's TTL bounds the staleness window.
    async fn invalidate_context_list(&self, user_id: Uuid) {
        let key = keys::user_contexts(user_id);
        if let Err(e) = self.cache.del(&key).await {
            tracing::warn!(key = %key, error = %e, "context list invalidation failed");
        }
    }
}
