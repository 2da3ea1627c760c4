//! In-memory registration repository implementation

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::registration::{Registration, RegistrationRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct InMemoryRegistrationRepository {
    registrations: Arc<RwLock<Vec<Registration>>>,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(registrations: &mut [Registration]) {
    registrations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn create(&self, registration: Registration) -> Result<Registration, DomainError> {
        self.registrations.write().await.push(registration.clone());
        Ok(registration)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Registration>, DomainError> {
        let mut owned: Vec<Registration> = self
            .registrations
            .read()
            .await
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut owned);

        Ok(owned)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Registration>, DomainError> {
        let mut all = self.registrations.read().await.clone();
        newest_first(&mut all);
        all.truncate(limit);

        Ok(all)
    }
}
