//! Fire-and-forget audit recording.
//!
//! Audit writes ride an unbounded channel into a spawned writer task,
//! so a slow or failing sink can never add latency or failure to the
//! request it is recording. Failures are logged to the operator error
//! channel and swallowed — availability over completeness.

use tokio::sync::mpsc;

use versa_core::models::audit::CreateAuditEntry;
use versa_core::repository::AuditLogRepository;

#[derive(Clone)]
pub struct AuditRecorder {
    tx: mpsc::UnboundedSender<CreateAuditEntry>,
}

impl AuditRecorder {
    /// Spawn the writer task over the given repository.
    pub fn spawn<R>(repo: R) -> Self
    where
        R: AuditLogRepository + Clone + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<CreateAuditEntry>();

        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(e) = repo.append(entry).await {
                    tracing::error!(error = %e, "audit write failed, entry dropped");
                }
            }
        });

        Self { tx }
    }

    /// Enqueue an entry. Never fails from the caller's point of view; a
    /// closed channel (writer task gone) is logged and ignored.
    pub fn record(&self, entry: CreateAuditEntry) {
        if self.tx.send(entry).is_err() {
            tracing::error!("audit channel closed, entry dropped");
        }
    }
}
