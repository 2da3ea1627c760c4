//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::page::Page;
use crate::domain::user::{User, UserId, UserQuery, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, entra_id, email, is_active, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_entra_id(&self, entra_id: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE entra_id = $1",
            USER_COLUMNS
        ))
        .bind(entra_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by identity: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn upsert_by_entra_id(&self, entra_id: &str, email: &str) -> Result<User, DomainError> {
        let candidate = User::new(entra_id, email);

        // The conflict branch leaves is_active untouched
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, entra_id, email, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, TRUE, $4, $4)
            ON CONFLICT (entra_id) DO UPDATE
            SET email = EXCLUDED.email,
                updated_at = CASE WHEN users.email = EXCLUDED.email
                                  THEN users.updated_at ELSE EXCLUDED.updated_at END
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(candidate.id().as_uuid())
        .bind(entra_id)
        .bind(email)
        .bind(candidate.created_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to upsert user: {}", e)))?;

        row_to_user(&row)
    }

    async fn set_active(&self, id: &UserId, active: bool) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update user status: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError> {
        let pattern = query.search.as_ref().map(|s| format!("%{}%", escape_like(s)));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE $1::TEXT IS NULL OR email ILIKE $1 OR entra_id ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM users
            WHERE $1::TEXT IS NULL OR email ILIKE $1 OR entra_id ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            USER_COLUMNS
        ))
        .bind(&pattern)
        .bind(query.page.page_size() as i64)
        .bind(query.page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        let users = rows.iter().map(row_to_user).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(users, query.page, total as usize))
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| DomainError::storage(format!("Invalid user row: {}", e)))?;

    Ok(User::restore(
        UserId::from_uuid(id),
        row.get("entra_id"),
        row.get("email"),
        row.get("is_active"),
        row.get("created_at"),
        row.get("updated_at"),
    ))
}

/// Escape LIKE wildcards in user-supplied search text
pub(crate) fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
