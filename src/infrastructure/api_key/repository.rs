//! In-memory API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, KeyIdentifier, RevokeOutcome};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of ApiKeyRepository
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: Arc<RwLock<HashMap<ApiKeyId, ApiKey>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail with a storage error
    pub async fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().await = fail;
    }

    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keys.read().await.is_empty()
    }

    async fn check_should_fail(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::storage("API key repository configured to fail"));
        }
        Ok(())
    }
}

fn newest_first(keys: &mut [ApiKey]) {
    keys.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        self.check_should_fail().await?;

        let mut keys = self.keys.write().await;

        if keys.contains_key(api_key.id()) {
            return Err(DomainError::conflict(format!(
                "API key with ID '{}' already exists",
                api_key.id()
            )));
        }

        if keys
            .values()
            .any(|k| k.key_identifier() == api_key.key_identifier())
        {
            return Err(DomainError::conflict(format!(
                "API key with identifier '{}' already exists",
                api_key.key_identifier()
            )));
        }

        keys.insert(*api_key.id(), api_key.clone());
        Ok(api_key)
    }

    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.get(id).cloned())
    }

    async fn find_active_by_identifier(
        &self,
        identifier: &KeyIdentifier,
    ) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;

        Ok(keys
            .values()
            .find(|k| k.key_identifier() == identifier && !k.is_revoked())
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.keys.read().await;

        let mut owned: Vec<ApiKey> = keys
            .values()
            .filter(|k| k.is_owned_by(user_id))
            .cloned()
            .collect();
        newest_first(&mut owned);

        Ok(owned)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.keys.read().await;

        let mut all: Vec<ApiKey> = keys.values().cloned().collect();
        newest_first(&mut all);
        all.truncate(limit);

        Ok(all)
    }

    async fn revoke(
        &self,
        id: &ApiKeyId,
        owner: Option<&UserId>,
        at: DateTime<Utc>,
    ) -> Result<RevokeOutcome, DomainError> {
        self.check_should_fail().await?;

        let mut keys = self.keys.write().await;

        let Some(key) = keys.get_mut(id) else {
            return Ok(RevokeOutcome::NotFound);
        };

        if owner.is_some_and(|owner| !key.is_owned_by(owner)) {
            return Ok(RevokeOutcome::NotFound);
        }

        if key.mark_revoked(at) {
            Ok(RevokeOutcome::Revoked(key.clone()))
        } else {
            Ok(RevokeOutcome::AlreadyRevoked(key.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_for(user: UserId, name: &str) -> ApiKey {
        ApiKey::new(
            user,
            KeyIdentifier::new(name, "1").unwrap(),
            "testing",
            None,
        )
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_identifier() {
        let repo = InMemoryApiKeyRepository::new();
        let key = repo.create(key_for(UserId::generate(), "a")).await.unwrap();

        let found = repo
            .find_active_by_identifier(key.key_identifier())
            .await
            .unwrap();
        assert_eq!(found.unwrap().id(), key.id());
    }

    #[tokio::test]
    async fn test_duplicate_identifier_conflicts() {
        let repo = InMemoryApiKeyRepository::new();
        repo.create(key_for(UserId::generate(), "a")).await.unwrap();

        let err = repo
            .create(key_for(UserId::generate(), "a"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_revoke_is_conditional() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = UserId::generate();
        let key = repo.create(key_for(owner, "a")).await.unwrap();
        let first_at = Utc::now();

        let first = repo.revoke(key.id(), Some(&owner), first_at).await.unwrap();
        let second = repo
            .revoke(key.id(), Some(&owner), first_at + chrono::Duration::seconds(5))
            .await
            .unwrap();

        assert!(matches!(first, RevokeOutcome::Revoked(_)));
        match second {
            RevokeOutcome::AlreadyRevoked(k) => assert_eq!(k.revoked_at(), Some(first_at)),
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert!(repo
            .find_active_by_identifier(key.key_identifier())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_revoke_foreign_key_is_not_found() {
        let repo = InMemoryApiKeyRepository::new();
        let key = repo.create(key_for(UserId::generate(), "a")).await.unwrap();

        let outcome = repo
            .revoke(key.id(), Some(&UserId::generate()), Utc::now())
            .await
            .unwrap();

        assert!(matches!(outcome, RevokeOutcome::NotFound));
        assert!(!repo.get(key.id()).await.unwrap().unwrap().is_revoked());
    }

    #[tokio::test]
    async fn test_list_for_user_only_returns_owned() {
        let repo = InMemoryApiKeyRepository::new();
        let alice = UserId::generate();
        repo.create(key_for(alice, "a1")).await.unwrap();
        repo.create(key_for(alice, "a2")).await.unwrap();
        repo.create(key_for(UserId::generate(), "b1")).await.unwrap();

        assert_eq!(repo.list_for_user(&alice).await.unwrap().len(), 2);
        assert_eq!(repo.list_recent(2).await.unwrap().len(), 2);
    }
}
