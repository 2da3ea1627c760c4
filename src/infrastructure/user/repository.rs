//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::page::Page;
use crate::domain::user::{User, UserId, UserQuery, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    /// Identity subject -> user ID
    entra_index: HashMap<String, UserId>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut table = UserTable::default();

        for user in users {
            table
                .entra_index
                .insert(user.entra_id().to_string(), *user.id());
            table.users.insert(*user.id(), user);
        }

        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(id).cloned())
    }

    async fn get_by_entra_id(&self, entra_id: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .entra_index
            .get(entra_id)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn upsert_by_entra_id(&self, entra_id: &str, email: &str) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if let Some(id) = table.entra_index.get(entra_id).copied() {
            let user = table
                .users
                .get_mut(&id)
                .ok_or_else(|| DomainError::internal("User index out of sync"))?;

            if user.email() != email {
                user.set_email(email);
            }

            return Ok(user.clone());
        }

        let user = User::new(entra_id, email);
        table.entra_index.insert(entra_id.to_string(), *user.id());
        table.users.insert(*user.id(), user.clone());

        Ok(user)
    }

    async fn set_active(&self, id: &UserId, active: bool) -> Result<Option<User>, DomainError> {
        let mut table = self.table.write().await;

        Ok(table.users.get_mut(id).map(|user| {
            user.set_active(active);
            user.clone()
        }))
    }

    async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError> {
        let table = self.table.read().await;

        let mut matched: Vec<User> = table
            .users
            .values()
            .filter(|user| query.matches(user))
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(query.page.offset())
            .take(query.page.page_size())
            .collect();

        Ok(Page::new(items, query.page, total))
    }
}
