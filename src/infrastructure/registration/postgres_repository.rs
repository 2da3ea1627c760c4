//! PostgreSQL registration repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::registration::{Purpose, Registration, RegistrationId, RegistrationRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const REGISTRATION_COLUMNS: &str = "id, user_id, purpose, project_name, contact_email, created_at";

#[derive(Debug, Clone)]
pub struct PostgresRegistrationRepository {
    pool: PgPool,
}

impl PostgresRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepository {
    async fn create(&self, registration: Registration) -> Result<Registration, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO registrations (id, user_id, purpose, project_name, contact_email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(registration.id.as_uuid())
        .bind(registration.user_id.as_uuid())
        .bind(registration.purpose.as_str())
        .bind(&registration.project_name)
        .bind(&registration.contact_email)
        .bind(registration.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create registration: {}", e)))?;

        Ok(registration)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Registration>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM registrations WHERE user_id = $1 ORDER BY created_at DESC",
            REGISTRATION_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list registrations: {}", e)))?;

        rows.iter().map(row_to_registration).collect()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Registration>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM registrations ORDER BY created_at DESC LIMIT $1",
            REGISTRATION_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list registrations: {}", e)))?;

        rows.iter().map(row_to_registration).collect()
    }
}

fn row_to_registration(row: &sqlx::postgres::PgRow) -> Result<Registration, DomainError> {
    let purpose: String = row.get("purpose");
    let purpose: Purpose = purpose
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid purpose in database: {}", e)))?;

    Ok(Registration {
        id: RegistrationId::from_uuid(row.get("id")),
        user_id: UserId::from_uuid(row.get("user_id")),
        purpose,
        project_name: row.get("project_name"),
        contact_email: row.get("contact_email"),
        created_at: row.get("created_at"),
    })
}
