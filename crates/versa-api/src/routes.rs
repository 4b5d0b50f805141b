//! Route handlers for the access-check contract.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use versa_auth::context::{AuthSession, SwitchOutcome};
use versa_auth::screens::ScreenAccess;
use versa_auth::token::Claims;
use versa_core::models::audit::AuditEntry;
use versa_core::models::context::{AvailableContexts, ContextType};
use versa_core::repository::{AuditFilter, AuditLogRepository, Pagination};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

pub async fn login(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthSession>, ApiError> {
    let session = state.service.authenticate(&request.email).await?;
    Ok(Json(session))
}

pub async fn list_contexts(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AvailableContexts>, ApiError> {
    let contexts = state.service.list_contexts(claims.sub).await?;
    Ok(Json(contexts))
}

#[derive(Debug, Deserialize)]
pub struct SwitchRequest {
    pub target_context_id: Uuid,
    #[serde(default)]
    pub target_type: Option<ContextType>,
}

pub async fn switch_context(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<SwitchRequest>,
) -> Result<Json<SwitchOutcome>, ApiError> {
    let outcome = state
        .service
        .switch_context(claims.sub, request.target_context_id, request.target_type)
        .await?;
    Ok(Json(outcome))
}

pub async fn check_screen(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(screen): Path<String>,
) -> Result<Json<ScreenAccess>, ApiError> {
    let access = state.guard.check_screen_access(&claims, &screen).await?;
    Ok(Json(access))
}

#[derive(Debug, Deserialize)]
pub struct PermissionQuery {
    pub resource: String,
    pub action: String,
    pub resource_id: Option<Uuid>,
}

/// The `(resource, action, resource_id?)` admission check route guards
/// consume.
pub async fn check_permission(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PermissionQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let allowed = state
        .resolver
        .check_permission(&claims, &query.resource, &query.action, query.resource_id)
        .await?;
    Ok(Json(serde_json::json!({ "allowed": allowed })))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<Uuid>,
    pub context_id: Option<Uuid>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// The audit read contract: filter by user or context, timestamp
/// ascending.
pub async fn list_audit(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    // Callers read their own trail unless they hold the wildcard role.
    let user_id = if claims.role == versa_core::models::permission::roles::PLATFORM_SUPER_ADMIN {
        query.user_id
    } else {
        Some(claims.sub)
    };

    let entries = state
        .store
        .list(
            AuditFilter {
                user_id,
                context_id: query.context_id,
            },
            Pagination {
                offset: query.offset.unwrap_or(0),
                limit: query.limit.unwrap_or(50),
            },
        )
        .await?;
    Ok(Json(entries))
}
