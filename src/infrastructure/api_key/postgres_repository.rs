//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, KeyIdentifier, RevokeOutcome};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const API_KEY_COLUMNS: &str = "id, user_id, key_identifier, usage_description, \
                               monthly_cap_tokens, shown_once, revoked_at, created_at";

/// PostgreSQL implementation of ApiKeyRepository
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, user_id, key_identifier, usage_description,
                                  monthly_cap_tokens, shown_once, revoked_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(api_key.id().as_uuid())
        .bind(api_key.user_id().as_uuid())
        .bind(api_key.key_identifier().to_string())
        .bind(api_key.usage_description())
        .bind(api_key.monthly_cap_tokens().map(cap_to_db))
        .bind(api_key.shown_once())
        .bind(api_key.revoked_at())
        .bind(api_key.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "API key with identifier '{}' already exists",
                    api_key.key_identifier()
                ))
            } else {
                DomainError::storage(format!("Failed to create API key: {}", e))
            }
        })?;

        Ok(api_key)
    }

    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM api_keys WHERE id = $1",
            API_KEY_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn get_for_owner(
        &self,
        id: &ApiKeyId,
        owner: &UserId,
    ) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM api_keys WHERE id = $1 AND user_id = $2",
            API_KEY_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn find_active_by_identifier(
        &self,
        identifier: &KeyIdentifier,
    ) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM api_keys WHERE key_identifier = $1 AND revoked_at IS NULL",
            API_KEY_COLUMNS
        ))
        .bind(identifier.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up API key: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM api_keys WHERE user_id = $1 ORDER BY created_at DESC",
            API_KEY_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter().map(row_to_api_key).collect()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ApiKey>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM api_keys ORDER BY created_at DESC LIMIT $1",
            API_KEY_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter().map(row_to_api_key).collect()
    }

    async fn revoke(
        &self,
        id: &ApiKeyId,
        owner: Option<&UserId>,
        at: DateTime<Utc>,
    ) -> Result<RevokeOutcome, DomainError> {
        let owner = owner.map(|o| o.as_uuid());

        // Single conditional write; only one concurrent caller gets a row back
        let updated = sqlx::query(&format!(
            r#"
            UPDATE api_keys SET revoked_at = $3
            WHERE id = $1 AND revoked_at IS NULL AND ($2::UUID IS NULL OR user_id = $2)
            RETURNING {}
            "#,
            API_KEY_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(owner)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to revoke API key: {}", e)))?;

        if let Some(row) = updated {
            return Ok(RevokeOutcome::Revoked(row_to_api_key(&row)?));
        }

        let existing = sqlx::query(&format!(
            "SELECT {} FROM api_keys WHERE id = $1 AND ($2::UUID IS NULL OR user_id = $2)",
            API_KEY_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        match existing {
            Some(row) => Ok(RevokeOutcome::AlreadyRevoked(row_to_api_key(&row)?)),
            None => Ok(RevokeOutcome::NotFound),
        }
    }
}

fn cap_to_db(cap: u64) -> i64 {
    i64::try_from(cap).unwrap_or(i64::MAX)
}

fn cap_from_db(cap: i64) -> u64 {
    u64::try_from(cap).unwrap_or(0)
}

fn row_to_api_key(row: &sqlx::postgres::PgRow) -> Result<ApiKey, DomainError> {
    let key_identifier: String = row.get("key_identifier");
    let key_identifier: KeyIdentifier = key_identifier.parse().map_err(|e| {
        DomainError::storage(format!("Invalid key identifier in database: {}", e))
    })?;
    let monthly_cap_tokens: Option<i64> = row.get("monthly_cap_tokens");

    Ok(ApiKey::restore(
        ApiKeyId::from_uuid(row.get("id")),
        UserId::from_uuid(row.get("user_id")),
        key_identifier,
        row.get("usage_description"),
        monthly_cap_tokens.map(cap_from_db),
        row.get("shown_once"),
        row.get("revoked_at"),
        row.get("created_at"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_conversion_saturates() {
        assert_eq!(cap_to_db(1000), 1000);
        assert_eq!(cap_to_db(u64::MAX), i64::MAX);
        assert_eq!(cap_from_db(1000), 1000);
        assert_eq!(cap_from_db(-1), 0);
    }
}
