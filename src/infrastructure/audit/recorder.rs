//! Audit recorder
//!
//! Audit entries are written after the mutation they describe has committed.
//! A failed write is logged and counted but never undoes the mutation.

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::audit::{AuditLogEntry, AuditLogView, AuditQuery, AuditRepository};
use crate::domain::page::Page;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_audit_write_failure;

#[derive(Debug, Clone)]
pub struct AuditRecorder {
    repository: Arc<dyn AuditRepository>,
}

impl AuditRecorder {
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Append an entry, surfacing the storage error to the caller
    pub async fn append(&self, entry: AuditLogEntry) -> Result<(), DomainError> {
        self.repository.append(entry).await
    }

    /// Append an entry after a committed mutation. Failures are logged and
    /// counted as `keyportal_audit_write_failures_total`.
    pub async fn record(&self, entry: AuditLogEntry) {
        let action = entry.action;
        let api_key_id = entry.api_key_id;
        let actor = entry.actor_user_id;

        match self.repository.append(entry).await {
            Ok(()) => debug!(action = %action, "Audit entry written"),
            Err(e) => {
                record_audit_write_failure(action.as_str());
                error!(
                    action = %action,
                    actor_user_id = ?actor.map(|id| id.to_string()),
                    api_key_id = ?api_key_id.map(|id| id.to_string()),
                    error = %e,
                    "Failed to write audit entry"
                );
            }
        }
    }

    /// Filtered audit entries, newest first
    pub async fn query(&self, query: &AuditQuery) -> Result<Page<AuditLogView>, DomainError> {
        self.repository.query(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::AuditAction;
    use crate::infrastructure::audit::InMemoryAuditRepository;
    use crate::infrastructure::user::InMemoryUserRepository;

    #[tokio::test]
    async fn test_record_swallows_failures() {
        let repo = Arc::new(InMemoryAuditRepository::new(Arc::new(
            InMemoryUserRepository::new(),
        )));
        repo.set_should_fail(true).await;

        let recorder = AuditRecorder::new(repo.clone());
        recorder.record(AuditLogEntry::new(AuditAction::Login)).await;

        assert!(recorder
            .append(AuditLogEntry::new(AuditAction::Login))
            .await
            .is_err());

        repo.set_should_fail(false).await;
        assert_eq!(repo.entries().await.len(), 0);
    }

    #[tokio::test]
    async fn test_record_appends() {
        let repo = Arc::new(InMemoryAuditRepository::new(Arc::new(
            InMemoryUserRepository::new(),
        )));
        let recorder = AuditRecorder::new(repo.clone());

        recorder.record(AuditLogEntry::new(AuditAction::Login)).await;

        assert_eq!(repo.entries().await.len(), 1);
    }
}
