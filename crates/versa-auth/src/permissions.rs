//! Permission resolution.
//!
//! Order of authority: the platform super admin role short-circuits to
//! "allowed"; then the token's explicit grants; then the role's static
//! grants from reference data. "Not permitted" is an `Ok(false)`, never
//! an error — only infrastructure faults raise.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use versa_core::error::CoreResult;
use versa_core::models::permission::{roles, Permission};
use versa_core::repository::RolePermissionRepository;

use crate::token::Claims;

/// Role→permission cache with no TTL.
///
/// Role permissions are rarely-mutated reference data, so entries live
/// until someone who mutates the reference table calls
/// [`invalidate`](Self::invalidate). The cache is an owned object, not
/// a process global — whoever constructs the resolver owns its
/// lifecycle.
#[derive(Default)]
pub struct RolePermissionCache {
    inner: RwLock<HashMap<String, Arc<Vec<Permission>>>>,
}

impl RolePermissionCache {
    pub async fn get(&self, role: &str) -> Option<Arc<Vec<Permission>>> {
        self.inner.read().await.get(role).cloned()
    }

    pub async fn insert(&self, role: &str, permissions: Vec<Permission>) -> Arc<Vec<Permission>> {
        let permissions = Arc::new(permissions);
        self.inner
            .write()
            .await
            .insert(role.to_string(), permissions.clone());
        permissions
    }

    /// Drop one role's entry. Call after mutating that role's
    /// reference data.
    pub async fn invalidate(&self, role: &str) {
        self.inner.write().await.remove(role);
    }

    /// Drop everything. Call after bulk reference-data changes.
    pub async fn invalidate_all(&self) {
        self.inner.write().await.clear();
    }
}

pub struct PermissionResolver<R: RolePermissionRepository> {
    repo: R,
    cache: RolePermissionCache,
}

impl<R: RolePermissionRepository> PermissionResolver<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            cache: RolePermissionCache::default(),
        }
    }

    /// Whether the token's context authorizes `(resource, action)`,
    /// optionally narrowed to one resource id.
    pub async fn check_permission(
        &self,
        claims: &Claims,
        resource: &str,
        action: &str,
        resource_id: Option<Uuid>,
    ) -> CoreResult<bool> {
        // Platform super admin is granted everything, unconditionally.
        if claims.role == roles::PLATFORM_SUPER_ADMIN {
            return Ok(true);
        }

        // Explicit grants embedded in the token.
        if claims
            .permissions
            .iter()
            .any(|p| p.matches(resource, action, resource_id))
        {
            return Ok(true);
        }

        // Role-based grants from reference data. These carry no
        // resource-id constraint.
        let role_permissions = self.role_permissions(&claims.role).await?;
        Ok(role_permissions
            .iter()
            .any(|p| p.matches(resource, action, None)))
    }

    async fn role_permissions(&self, role: &str) -> CoreResult<Arc<Vec<Permission>>> {
        if let Some(cached) = self.cache.get(role).await {
            return Ok(cached);
        }
        let fetched = self.repo.permissions_for_role(role).await?;
        Ok(self.cache.insert(role, fetched).await)
    }

    /// Mutate reference data through the resolver so the cache entry
    /// drops in the same breath.
    pub async fn grant_to_role(&self, role: &str, resource: &str, action: &str) -> CoreResult<()> {
        self.repo.grant(role, resource, action).await?;
        self.cache.invalidate(role).await;
        Ok(())
    }

    pub async fn revoke_from_role(
        &self,
        role: &str,
        resource: &str,
        action: &str,
    ) -> CoreResult<()> {
        self.repo.revoke(role, resource, action).await?;
        self.cache.invalidate(role).await;
        Ok(())
    }

    /// Invalidation hook for reference-data changes made outside the
    /// resolver.
    pub async fn invalidate_role(&self, role: &str) {
        self.cache.invalidate(role).await;
    }
}
