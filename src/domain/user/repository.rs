//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::page::{Page, PageRequest};
use crate::domain::DomainError;

/// Query parameters for the admin user listing
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Case-insensitive substring matched against email and identity subject
    pub search: Option<String>,
    pub page: PageRequest,
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let trimmed = search.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Whether a user matches the search filter
    pub fn matches(&self, user: &User) -> bool {
        match &self.search {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                user.email().to_lowercase().contains(&needle)
                    || user.entra_id().to_lowercase().contains(&needle)
            }
        }
    }
}

/// Repository trait for user storage
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by external identity subject
    async fn get_by_entra_id(&self, entra_id: &str) -> Result<Option<User>, DomainError>;

    /// Insert a user for this identity, or refresh the email of the existing one.
    ///
    /// Never changes the active flag of an existing user.
    async fn upsert_by_entra_id(&self, entra_id: &str, email: &str) -> Result<User, DomainError>;

    /// Set the active flag. Returns `None` if the user does not exist.
    async fn set_active(&self, id: &UserId, active: bool) -> Result<Option<User>, DomainError>;

    /// List users newest first
    async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError>;
}
