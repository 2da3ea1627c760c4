//! PostgreSQL usage repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::api_key::ApiKeyId;
use crate::domain::usage::{validate_tokens, UsageEvent, UsageRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of UsageRepository
#[derive(Debug, Clone)]
pub struct PostgresUsageRepository {
    pool: PgPool,
}

impl PostgresUsageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PostgresUsageRepository {
    async fn append(&self, event: UsageEvent) -> Result<(), DomainError> {
        let tokens = validate_tokens(event.tokens)? as i64;

        sqlx::query(
            r#"
            INSERT INTO usage_events (id, api_key_id, model, tokens, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(event.api_key_id.as_uuid())
        .bind(&event.model)
        .bind(tokens)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to record usage: {}", e)))?;

        Ok(())
    }

    async fn sum_tokens_between(
        &self,
        api_key_id: &ApiKeyId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        // SUM over BIGINT yields NUMERIC; saturate before casting back
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT LEAST(COALESCE(SUM(tokens), 0), 9223372036854775807)::BIGINT
            FROM usage_events
            WHERE api_key_id = $1 AND created_at >= $2 AND created_at <= $3
            "#,
        )
        .bind(api_key_id.as_uuid())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to sum usage: {}", e)))?;

        Ok(u64::try_from(total).unwrap_or(0))
    }
}
