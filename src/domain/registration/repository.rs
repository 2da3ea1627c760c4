//! Registration repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::Registration;
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[async_trait]
pub trait RegistrationRepository: Send + Sync + Debug {
    async fn create(&self, registration: Registration) -> Result<Registration, DomainError>;

    /// A user's registrations, newest first
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Registration>, DomainError>;

    /// Most recent registrations across all users
    async fn list_recent(&self, limit: usize) -> Result<Vec<Registration>, DomainError>;
}
