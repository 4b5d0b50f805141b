//! In-memory implementation of [`EnterpriseRepository`].
//!
//! The create operations are compound: the enterprise (or seat) and the
//! creator's context are inserted under one write guard, so no reader
//! ever observes an enterprise without its owner context.

use chrono::Utc;
use uuid::Uuid;

use versa_core::error::{CoreError, CoreResult};
use versa_core::models::context::UserContext;
use versa_core::models::enterprise::{
    AgencySeat, CreateAgencySeat, CreateEnterprise, Enterprise, SubscriptionTier,
};
use versa_core::models::permission::{roles, Permission};
use versa_core::repository::EnterpriseRepository;

use crate::store::MemoryStore;

impl EnterpriseRepository for MemoryStore {
    async fn create(&self, input: CreateEnterprise, owner_user_id: Uuid) -> CoreResult<Enterprise> {
        let mut tables = self.tables.write().await;

        if tables.enterprises.values().any(|e| e.slug == input.slug) {
            return Err(CoreError::AlreadyExists {
                entity: "enterprise".into(),
            });
        }

        let now = Utc::now();
        let enterprise = Enterprise {
            id: Uuid::new_v4(),
            name: input.name,
            slug: input.slug,
            kind: input.kind,
            subscription_tier: input.subscription_tier.unwrap_or(SubscriptionTier::Standard),
            settings: input.settings.unwrap_or_else(|| serde_json::json!({})),
            created_at: now,
            updated_at: now,
        };

        // Owner gets a default full-permission context in the same
        // transaction.
        tables.demote_defaults(owner_user_id);
        let context = UserContext {
            id: Uuid::new_v4(),
            user_id: owner_user_id,
            enterprise_id: enterprise.id,
            agency_seat_id: None,
            role: roles::ENTERPRISE_OWNER.into(),
            permissions: vec![Permission::all()],
            is_default: true,
            is_active: true,
            last_accessed: None,
            created_at: now,
        };

        tables.enterprises.insert(enterprise.id, enterprise.clone());
        tables.user_contexts.insert(context.id, context);
        Ok(enterprise)
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Enterprise> {
        let tables = self.tables.read().await;
        tables.enterprise(id).cloned()
    }

    async fn create_seat(&self, input: CreateAgencySeat, created_by: Uuid) -> CoreResult<AgencySeat> {
        let mut tables = self.tables.write().await;

        // Seat must hang off an existing enterprise.
        tables.enterprise(input.enterprise_id)?;

        let now = Utc::now();
        let seat = AgencySeat {
            id: Uuid::new_v4(),
            enterprise_id: input.enterprise_id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            seat_kind: input.seat_kind.unwrap_or_else(|| "standard".into()),
            settings: input.settings.unwrap_or_else(|| serde_json::json!({})),
            created_at: now,
        };

        let context = UserContext {
            id: Uuid::new_v4(),
            user_id: created_by,
            enterprise_id: input.enterprise_id,
            agency_seat_id: Some(seat.id),
            role: roles::SEAT_ADMIN.into(),
            permissions: vec![
                Permission::new("agency_seats", "manage"),
                Permission::new("policies", "assign"),
                Permission::new("users", "invite"),
            ],
            is_default: false,
            is_active: true,
            last_accessed: None,
            created_at: now,
        };

        tables.agency_seats.insert(seat.id, seat.clone());
        tables.user_contexts.insert(context.id, context);
        Ok(seat)
    }
}
