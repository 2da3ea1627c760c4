//! API Key repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId, KeyIdentifier};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Result of a conditional revocation
#[derive(Debug, Clone)]
pub enum RevokeOutcome {
    /// This call moved the key from active to revoked
    Revoked(ApiKey),
    /// The key was revoked before this call; nothing changed
    AlreadyRevoked(ApiKey),
    /// No key with that id (or not visible to the given owner)
    NotFound,
}

/// Repository trait for API key metadata storage
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Persist a newly issued key
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError>;

    /// Get an API key by its ID
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError>;

    /// Get an API key only if it belongs to `owner`
    async fn get_for_owner(
        &self,
        id: &ApiKeyId,
        owner: &UserId,
    ) -> Result<Option<ApiKey>, DomainError> {
        Ok(self.get(id).await?.filter(|key| key.is_owned_by(owner)))
    }

    /// Look up a non-revoked key by its vault reference
    async fn find_active_by_identifier(
        &self,
        identifier: &KeyIdentifier,
    ) -> Result<Option<ApiKey>, DomainError>;

    /// All keys of a user, newest first
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError>;

    /// Most recently created keys across all users
    async fn list_recent(&self, limit: usize) -> Result<Vec<ApiKey>, DomainError>;

    /// Set `revoked_at` only if it is still unset.
    ///
    /// When `owner` is given, keys belonging to someone else report `NotFound`.
    /// Of any number of concurrent calls for the same key, exactly one observes
    /// `Revoked`.
    async fn revoke(
        &self,
        id: &ApiKeyId,
        owner: Option<&UserId>,
        at: DateTime<Utc>,
    ) -> Result<RevokeOutcome, DomainError>;
}
