//! In-memory audit repository implementation

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::audit::{AuditLogEntry, AuditLogView, AuditQuery, AuditRepository};
use crate::domain::page::Page;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;

/// In-memory implementation of AuditRepository
///
/// Actor emails are resolved through the user repository at query time.
#[derive(Debug)]
pub struct InMemoryAuditRepository {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
    users: Arc<dyn UserRepository>,
    should_fail: Arc<RwLock<bool>>,
}

impl InMemoryAuditRepository {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            users,
            should_fail: Arc::new(RwLock::new(false)),
        }
    }

    /// Make every append fail with a storage error
    pub async fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().await = fail;
    }

    /// Snapshot of all entries in insertion order
    pub async fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::storage("Audit repository configured to fail"));
        }

        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> Result<Page<AuditLogView>, DomainError> {
        let entries = self.entries.read().await.clone();

        let mut views = Vec::new();
        for entry in entries.into_iter().rev() {
            let actor_email = match entry.actor_user_id {
                Some(id) => self.users.get(&id).await?.map(|u| u.email().to_string()),
                None => None,
            };

            if query.matches(&entry, actor_email.as_deref()) {
                views.push(AuditLogView { entry, actor_email });
            }
        }

        views.sort_by(|a, b| b.entry.created_at.cmp(&a.entry.created_at));

        let total = views.len();
        let items = views
            .into_iter()
            .skip(query.page.offset())
            .take(query.page.page_size())
            .collect();

        Ok(Page::new(items, query.page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::AuditAction;
    use crate::domain::page::PageRequest;
    use crate::infrastructure::user::InMemoryUserRepository;
    use chrono::{Duration, Utc};

    async fn setup() -> (InMemoryAuditRepository, crate::domain::user::User) {
        let users = Arc::new(InMemoryUserRepository::new());
        let alice = users
            .upsert_by_entra_id("sub-alice", "alice@example.com")
            .await
            .unwrap();
        (InMemoryAuditRepository::new(users), alice)
    }

    #[tokio::test]
    async fn test_query_newest_first_with_email() {
        let (repo, alice) = setup().await;
        let now = Utc::now();

        repo.append(
            AuditLogEntry::new(AuditAction::CreateKey)
                .with_actor(*alice.id())
                .with_created_at(now - Duration::minutes(5)),
        )
        .await
        .unwrap();
        repo.append(
            AuditLogEntry::new(AuditAction::RevokeKey)
                .with_actor(*alice.id())
                .with_created_at(now),
        )
        .await
        .unwrap();

        let page = repo.query(&AuditQuery::new()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].entry.action, AuditAction::RevokeKey);
        assert_eq!(page.items[0].actor_email.as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn test_query_filters() {
        let (repo, alice) = setup().await;
        let now = Utc::now();

        repo.append(
            AuditLogEntry::new(AuditAction::CreateKey)
                .with_actor(*alice.id())
                .with_created_at(now - Duration::days(2)),
        )
        .await
        .unwrap();
        repo.append(AuditLogEntry::new(AuditAction::CreateKey).with_created_at(now))
            .await
            .unwrap();
        repo.append(AuditLogEntry::new(AuditAction::Login).with_actor(*alice.id()))
            .await
            .unwrap();

        let by_action = repo
            .query(&AuditQuery::new().with_action(AuditAction::CreateKey))
            .await
            .unwrap();
        assert_eq!(by_action.total, 2);

        let by_email = repo
            .query(&AuditQuery::new().with_actor_email("ALICE@"))
            .await
            .unwrap();
        assert_eq!(by_email.total, 2);

        let recent_creates = repo
            .query(
                &AuditQuery::new()
                    .with_action(AuditAction::CreateKey)
                    .with_range(Some(now - Duration::days(1)), None),
            )
            .await
            .unwrap();
        assert_eq!(recent_creates.total, 1);
        assert!(recent_creates.items[0].entry.actor_user_id.is_none());
    }

    #[tokio::test]
    async fn test_query_paging() {
        let (repo, _) = setup().await;
        for _ in 0..12 {
            repo.append(AuditLogEntry::new(AuditAction::Login)).await.unwrap();
        }

        let page = repo
            .query(&AuditQuery::new().with_page(PageRequest::new(Some(2), Some(5))))
            .await
            .unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
    }
}
