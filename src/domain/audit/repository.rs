//! Audit log repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{AuditAction, AuditLogEntry, AuditLogView};
use crate::domain::api_key::ApiKeyId;
use crate::domain::page::{Page, PageRequest};
use crate::domain::DomainError;

/// Filters for the admin audit listing. All filters are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub action: Option<AuditAction>,
    /// Case-insensitive substring of the actor's email
    pub actor_email: Option<String>,
    pub api_key_id: Option<ApiKeyId>,
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub to: Option<DateTime<Utc>>,
    pub page: PageRequest,
}

impl AuditQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_actor_email(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        let trimmed = email.trim();
        self.actor_email = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_api_key(mut self, api_key_id: ApiKeyId) -> Self {
        self.api_key_id = Some(api_key_id);
        self
    }

    pub fn with_range(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Whether an entry (with its actor email) passes every filter
    pub fn matches(&self, entry: &AuditLogEntry, actor_email: Option<&str>) -> bool {
        if self.action.is_some_and(|action| action != entry.action) {
            return false;
        }

        if self.api_key_id.is_some() && self.api_key_id != entry.api_key_id {
            return false;
        }

        if self.from.is_some_and(|from| entry.created_at < from) {
            return false;
        }

        if self.to.is_some_and(|to| entry.created_at > to) {
            return false;
        }

        match &self.actor_email {
            None => true,
            Some(needle) => actor_email
                .is_some_and(|email| email.to_lowercase().contains(&needle.to_lowercase())),
        }
    }
}

/// Repository for audit records
#[async_trait]
pub trait AuditRepository: Send + Sync + Debug {
    /// Append an entry. Entries are never updated or deleted.
    async fn append(&self, entry: AuditLogEntry) -> Result<(), DomainError>;

    /// Filtered entries, newest first
    async fn query(&self, query: &AuditQuery) -> Result<Page<AuditLogView>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;

    #[test]
    fn test_matches_filters_conjunctively() {
        let entry = AuditLogEntry::new(AuditAction::CreateKey).with_actor(UserId::generate());

        assert!(AuditQuery::new().matches(&entry, None));
        assert!(AuditQuery::new()
            .with_action(AuditAction::CreateKey)
            .with_actor_email("ALICE")
            .matches(&entry, Some("alice@example.com")));
        assert!(!AuditQuery::new()
            .with_action(AuditAction::RevokeKey)
            .matches(&entry, Some("alice@example.com")));
        assert!(!AuditQuery::new()
            .with_actor_email("alice")
            .matches(&entry, None));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let entry = AuditLogEntry::new(AuditAction::Login);
        let at = entry.created_at;

        assert!(AuditQuery::new()
            .with_range(Some(at), Some(at))
            .matches(&entry, None));
        assert!(!AuditQuery::new()
            .with_range(Some(at + chrono::Duration::seconds(1)), None)
            .matches(&entry, None));
    }
}
