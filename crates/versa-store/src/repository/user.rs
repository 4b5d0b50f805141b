//! In-memory implementation of [`UserRepository`].

use chrono::Utc;
use uuid::Uuid;

use versa_core::error::{CoreError, CoreResult};
use versa_core::models::user::{CreateUser, User};
use versa_core::repository::UserRepository;

use crate::store::MemoryStore;

impl UserRepository for MemoryStore {
    async fn create(&self, input: CreateUser) -> CoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == input.email) {
            return Err(CoreError::AlreadyExists {
                entity: "user".into(),
            });
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: input.email,
            name: input.name,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("user", id))
    }

    async fn get_by_email(&self, email: &str) -> CoreResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| CoreError::not_found("user", email))
    }

    async fn deactivate(&self, id: Uuid) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("user", id))?;
        user.is_active = false;
        user.updated_at = Utc::now();
        Ok(())
    }
}
