//! API key lifecycle service
//!
//! Issues display-once secrets through the vault, revokes keys with a single
//! conditional write, and audits both after they commit.

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::api_key::{
    validate_usage_description, ApiKey, ApiKeyId, ApiKeyRepository, KeyIdentifier, RevokeOutcome,
};
use crate::domain::audit::{AuditAction, AuditLogEntry};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::vault::SecretVault;
use crate::domain::DomainError;
use crate::infrastructure::audit::AuditRecorder;
use crate::infrastructure::observability::{record_key_issued, record_key_revoked};

use super::generator::SecretGenerator;

/// A freshly issued key. The secret is not retrievable again after this value
/// is dropped.
#[derive(Debug)]
pub struct IssuedApiKey {
    pub api_key: ApiKey,
    pub secret: SecretString,
}

/// Result of a successful revoke call
#[derive(Debug, Clone)]
pub enum RevokeResult {
    /// This call revoked the key
    Revoked(ApiKey),
    /// The key was already revoked; nothing changed
    AlreadyRevoked(ApiKey),
}

impl RevokeResult {
    pub fn api_key(&self) -> &ApiKey {
        match self {
            Self::Revoked(key) | Self::AlreadyRevoked(key) => key,
        }
    }

    pub fn newly_revoked(&self) -> bool {
        matches!(self, Self::Revoked(_))
    }
}

/// API key lifecycle service
#[derive(Clone)]
pub struct ApiKeyService {
    repository: Arc<dyn ApiKeyRepository>,
    users: Arc<dyn UserRepository>,
    vault: Arc<dyn SecretVault>,
    audit: AuditRecorder,
    generator: SecretGenerator,
    default_monthly_cap: Option<u64>,
}

impl std::fmt::Debug for ApiKeyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyService")
            .field("vault", &self.vault.backend_name())
            .field("generator", &self.generator)
            .field("default_monthly_cap", &self.default_monthly_cap)
            .finish_non_exhaustive()
    }
}

impl ApiKeyService {
    pub fn new(
        repository: Arc<dyn ApiKeyRepository>,
        users: Arc<dyn UserRepository>,
        vault: Arc<dyn SecretVault>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            repository,
            users,
            vault,
            audit,
            generator: SecretGenerator::new(),
            default_monthly_cap: None,
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: SecretGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Cap applied to keys issued without an explicit one
    pub fn with_default_monthly_cap(mut self, cap: Option<u64>) -> Self {
        self.default_monthly_cap = cap;
        self
    }

    /// Issue a key with the default monthly cap
    pub async fn issue(
        &self,
        user_id: &UserId,
        usage_description: &str,
    ) -> Result<IssuedApiKey, DomainError> {
        self.issue_with_cap(user_id, usage_description, self.default_monthly_cap)
            .await
    }

    /// Issue a key and return its secret exactly once.
    ///
    /// Order: validate, vault write, metadata row, audit. A vault failure
    /// leaves no row and no audit entry. A row failure after the vault write
    /// withholds the secret and logs the orphaned vault entry.
    pub async fn issue_with_cap(
        &self,
        user_id: &UserId,
        usage_description: &str,
        monthly_cap_tokens: Option<u64>,
    ) -> Result<IssuedApiKey, DomainError> {
        let usage_description = validate_usage_description(usage_description)?;

        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", user_id)))?;

        if !user.is_active() {
            return Err(DomainError::forbidden("User account is deactivated"));
        }

        let secret = self.generator.generate();
        let vault_entry_name = self.generator.vault_entry_name(user_id, Utc::now());

        let entry = self
            .vault
            .store(&vault_entry_name, &secret)
            .await
            .inspect_err(|e| {
                warn!(user_id = %user_id, error = %e, "Vault write failed; no key issued");
            })?;

        let key_identifier = entry.key_identifier().map_err(|e| {
            error!(
                user_id = %user_id,
                orphaned_vault_entry = %vault_entry_name,
                error = %e,
                "Vault returned an unusable entry reference"
            );
            DomainError::internal("Failed to issue API key")
        })?;

        let api_key = ApiKey::new(
            *user_id,
            key_identifier,
            usage_description,
            monthly_cap_tokens,
        );

        let api_key = self.repository.create(api_key).await.map_err(|e| {
            error!(
                user_id = %user_id,
                orphaned_vault_entry = %vault_entry_name,
                error = %e,
                "Failed to record API key after vault write; secret withheld"
            );
            DomainError::internal("Failed to issue API key")
        })?;

        info!(
            api_key_id = %api_key.id(),
            user_id = %user_id,
            key_identifier = %api_key.key_identifier(),
            "API key issued"
        );
        record_key_issued();

        self.audit
            .record(
                AuditLogEntry::new(AuditAction::CreateKey)
                    .with_actor(*user_id)
                    .with_api_key(*api_key.id())
                    .with_metadata(json!({
                        "keyIdentifier": api_key.key_identifier().to_string(),
                        "usageDescription": api_key.usage_description(),
                        "monthlyCapTokens": api_key.monthly_cap_tokens(),
                    })),
            )
            .await;

        Ok(IssuedApiKey { api_key, secret })
    }

    /// Revoke one of the caller's own keys. Idempotent.
    ///
    /// Keys owned by someone else are reported as not found.
    pub async fn revoke(
        &self,
        id: &ApiKeyId,
        owner: &UserId,
    ) -> Result<RevokeResult, DomainError> {
        let outcome = self.repository.revoke(id, Some(owner), Utc::now()).await?;
        self.finish_revoke(outcome, *owner, json!({})).await
    }

    /// Revoke any key on behalf of an administrator. Idempotent.
    pub async fn revoke_as_admin(
        &self,
        id: &ApiKeyId,
        admin: &User,
    ) -> Result<RevokeResult, DomainError> {
        let outcome = self.repository.revoke(id, None, Utc::now()).await?;
        self.finish_revoke(outcome, *admin.id(), json!({ "adminActor": admin.email() }))
            .await
    }

    async fn finish_revoke(
        &self,
        outcome: RevokeOutcome,
        actor: UserId,
        mut metadata: serde_json::Value,
    ) -> Result<RevokeResult, DomainError> {
        match outcome {
            RevokeOutcome::NotFound => Err(DomainError::not_found("API key not found")),
            RevokeOutcome::AlreadyRevoked(key) => {
                info!(api_key_id = %key.id(), "API key already revoked");
                Ok(RevokeResult::AlreadyRevoked(key))
            }
            RevokeOutcome::Revoked(key) => {
                info!(api_key_id = %key.id(), actor_user_id = %actor, "API key revoked");
                record_key_revoked();

                metadata["keyIdentifier"] = json!(key.key_identifier().to_string());

                self.audit
                    .record(
                        AuditLogEntry::new(AuditAction::RevokeKey)
                            .with_actor(actor)
                            .with_api_key(*key.id())
                            .with_metadata(metadata),
                    )
                    .await;

                Ok(RevokeResult::Revoked(key))
            }
        }
    }

    pub async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        self.repository.get(id).await
    }

    pub async fn get_for_owner(
        &self,
        id: &ApiKeyId,
        owner: &UserId,
    ) -> Result<Option<ApiKey>, DomainError> {
        self.repository.get_for_owner(id, owner).await
    }

    /// A user's keys, newest first
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        self.repository.list_for_user(user_id).await
    }

    /// Most recent keys across all users
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<ApiKey>, DomainError> {
        self.repository.list_recent(limit).await
    }

    /// Resolve a presented key identifier to a non-revoked key
    pub async fn find_active_by_identifier(
        &self,
        identifier: &KeyIdentifier,
    ) -> Result<Option<ApiKey>, DomainError> {
        self.repository.find_active_by_identifier(identifier).await
    }
}
