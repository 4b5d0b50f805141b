//! In-memory implementation of [`AuditLogRepository`].

use chrono::Utc;
use uuid::Uuid;

use versa_core::error::CoreResult;
use versa_core::models::audit::{AuditEntry, CreateAuditEntry};
use versa_core::repository::{AuditFilter, AuditLogRepository, Pagination};

use crate::store::MemoryStore;

impl AuditLogRepository for MemoryStore {
    async fn append(&self, input: CreateAuditEntry) -> CoreResult<AuditEntry> {
        let mut tables = self.tables.write().await;
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            context_id: input.context_id,
            action: input.action,
            resource_type: input.resource_type,
            resource_id: input.resource_id,
            details: input.details,
            timestamp: Utc::now(),
        };
        tables.audit_log.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, filter: AuditFilter, pagination: Pagination) -> CoreResult<Vec<AuditEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<AuditEntry> = tables
            .audit_log
            .iter()
            .filter(|e| filter.user_id.is_none_or(|id| e.user_id == id))
            .filter(|e| filter.context_id.is_none_or(|id| e.context_id == Some(id)))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .collect())
    }
}
