//! PostgreSQL audit repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::api_key::ApiKeyId;
use crate::domain::audit::{
    AuditAction, AuditLogEntry, AuditLogId, AuditLogView, AuditQuery, AuditRepository,
};
use crate::domain::page::Page;
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::user::escape_like;

/// Shared WHERE clause; parameters $1..$5 are action, email pattern, key id,
/// from, to. NULL disables a filter.
const AUDIT_FILTER: &str = r#"
    WHERE ($1::TEXT IS NULL OR a.action = $1)
      AND ($2::TEXT IS NULL OR u.email ILIKE $2)
      AND ($3::UUID IS NULL OR a.api_key_id = $3)
      AND ($4::TIMESTAMPTZ IS NULL OR a.created_at >= $4)
      AND ($5::TIMESTAMPTZ IS NULL OR a.created_at <= $5)
"#;

/// PostgreSQL implementation of AuditRepository
#[derive(Debug, Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, actor_user_id, action, api_key_id, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.actor_user_id.map(|id| id.as_uuid()))
        .bind(entry.action.as_str())
        .bind(entry.api_key_id.map(|id| id.as_uuid()))
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to write audit entry: {}", e)))?;

        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> Result<Page<AuditLogView>, DomainError> {
        let action = query.action.map(|a| a.as_str());
        let email = query
            .actor_email
            .as_ref()
            .map(|e| format!("%{}%", escape_like(e)));
        let api_key_id = query.api_key_id.map(|id| id.as_uuid());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM audit_logs a LEFT JOIN users u ON u.id = a.actor_user_id {}",
            AUDIT_FILTER
        ))
        .bind(action)
        .bind(&email)
        .bind(api_key_id)
        .bind(query.from)
        .bind(query.to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count audit entries: {}", e)))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT a.id, a.actor_user_id, a.action, a.api_key_id, a.metadata, a.created_at,
                   u.email AS actor_email
            FROM audit_logs a
            LEFT JOIN users u ON u.id = a.actor_user_id
            {}
            ORDER BY a.created_at DESC
            LIMIT $6 OFFSET $7
            "#,
            AUDIT_FILTER
        ))
        .bind(action)
        .bind(&email)
        .bind(api_key_id)
        .bind(query.from)
        .bind(query.to)
        .bind(query.page.page_size() as i64)
        .bind(query.page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to query audit entries: {}", e)))?;

        let views = rows
            .iter()
            .map(row_to_view)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(views, query.page, total as usize))
    }
}

fn row_to_view(row: &sqlx::postgres::PgRow) -> Result<AuditLogView, DomainError> {
    let action: String = row.get("action");
    let action: AuditAction = action
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid audit action in database: {}", e)))?;

    let entry = AuditLogEntry {
        id: AuditLogId::from_uuid(row.get("id")),
        actor_user_id: row
            .get::<Option<uuid::Uuid>, _>("actor_user_id")
            .map(UserId::from_uuid),
        action,
        api_key_id: row
            .get::<Option<uuid::Uuid>, _>("api_key_id")
            .map(ApiKeyId::from_uuid),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
    };

    Ok(AuditLogView {
        entry,
        actor_email: row.get("actor_email"),
    })
}
