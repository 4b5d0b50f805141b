//! In-memory implementation of [`RolePermissionRepository`].

use versa_core::error::CoreResult;
use versa_core::models::permission::{Permission, RolePermission};
use versa_core::repository::RolePermissionRepository;

use crate::store::MemoryStore;

impl RolePermissionRepository for MemoryStore {
    async fn permissions_for_role(&self, role: &str) -> CoreResult<Vec<Permission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .role_permissions
            .iter()
            .filter(|rp| rp.role == role && rp.granted)
            .map(|rp| Permission::new(rp.resource.clone(), rp.action.clone()))
            .collect())
    }

    async fn grant(&self, role: &str, resource: &str, action: &str) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(row) = tables
            .role_permissions
            .iter_mut()
            .find(|rp| rp.role == role && rp.resource == resource && rp.action == action)
        {
            row.granted = true;
            return Ok(());
        }
        tables.role_permissions.push(RolePermission {
            role: role.into(),
            resource: resource.into(),
            action: action.into(),
            granted: true,
        });
        Ok(())
    }

    async fn revoke(&self, role: &str, resource: &str, action: &str) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(row) = tables
            .role_permissions
            .iter_mut()
            .find(|rp| rp.role == role && rp.resource == resource && rp.action == action)
        {
            row.granted = false;
        }
        Ok(())
    }
}
