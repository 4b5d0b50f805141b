//! In-memory implementation of [`RelationshipRepository`].

use chrono::Utc;
use uuid::Uuid;

use versa_core::error::{CoreError, CoreResult};
use versa_core::models::relationship::{
    CreatePartnerRelationship, PartnerRelationship, RelationshipStatus, RiskLevel,
};
use versa_core::repository::RelationshipRepository;

use crate::store::MemoryStore;

impl RelationshipRepository for MemoryStore {
    async fn create(&self, input: CreatePartnerRelationship) -> CoreResult<PartnerRelationship> {
        if input.partner_enterprise_id == input.client_enterprise_id {
            return Err(CoreError::InvalidRelationship {
                reason: "partner and client enterprises must be different".into(),
            });
        }

        let mut tables = self.tables.write().await;

        tables.enterprise(input.partner_enterprise_id)?;
        tables.enterprise(input.client_enterprise_id)?;

        // At most one row per ordered pair.
        if tables
            .relationship_for_pair(input.partner_enterprise_id, input.client_enterprise_id)
            .is_some()
        {
            return Err(CoreError::AlreadyExists {
                entity: "partner relationship".into(),
            });
        }

        let now = Utc::now();
        let relationship = PartnerRelationship {
            id: Uuid::new_v4(),
            partner_enterprise_id: input.partner_enterprise_id,
            client_enterprise_id: input.client_enterprise_id,
            status: input.status.unwrap_or(RelationshipStatus::Pending),
            relationship_kind: input.relationship_kind.unwrap_or_else(|| "agency".into()),
            compliance_score: input.compliance_score.unwrap_or(0.0),
            risk_level: input.risk_level.unwrap_or(RiskLevel::Low),
            settings: input.settings.unwrap_or_else(|| serde_json::json!({})),
            created_by: input.created_by,
            created_at: now,
            updated_at: now,
        };
        tables
            .relationships
            .insert(relationship.id, relationship.clone());
        Ok(relationship)
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<PartnerRelationship> {
        let tables = self.tables.read().await;
        tables
            .relationships
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("partner relationship", id))
    }

    async fn get_pair(
        &self,
        partner_enterprise_id: Uuid,
        client_enterprise_id: Uuid,
    ) -> CoreResult<Option<PartnerRelationship>> {
        let tables = self.tables.read().await;
        Ok(tables
            .relationship_for_pair(partner_enterprise_id, client_enterprise_id)
            .cloned())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: RelationshipStatus,
    ) -> CoreResult<PartnerRelationship> {
        let mut tables = self.tables.write().await;
        let relationship = tables
            .relationships
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("partner relationship", id))?;
        relationship.status = status;
        relationship.updated_at = Utc::now();
        Ok(relationship.clone())
    }

    async fn list_clients(
        &self,
        partner_enterprise_id: Uuid,
        status: RelationshipStatus,
    ) -> CoreResult<Vec<PartnerRelationship>> {
        let tables = self.tables.read().await;
        Ok(tables
            .relationships
            .values()
            .filter(|r| r.partner_enterprise_id == partner_enterprise_id && r.status == status)
            .cloned()
            .collect())
    }

    async fn list_partners(
        &self,
        client_enterprise_id: Uuid,
        status: RelationshipStatus,
    ) -> CoreResult<Vec<PartnerRelationship>> {
        let tables = self.tables.read().await;
        Ok(tables
            .relationships
            .values()
            .filter(|r| r.client_enterprise_id == client_enterprise_id && r.status == status)
            .cloned()
            .collect())
    }
}
