//! Database migrations infrastructure

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Applies code-defined migrations, tracked in the `_migrations` table
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Runs a single migration. Returns false if it was already applied.
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)",
        )
        .bind(migration.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))?;

        if applied {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin migration: {}", e)))?;

        // raw_sql allows several statements per migration
        sqlx::raw_sql(&migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit migration: {}", e)))?;

        info!(version = migration.version, description = %migration.description, "Migration applied");

        Ok(true)
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        let version: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(version) FROM _migrations WHERE success = TRUE",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))?;

        Ok(version)
    }
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    pub up: String,
}

impl Migration {
    pub fn new(version: i64, description: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
        }
    }
}

/// Schema for the portal tables
pub fn portal_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                entra_id TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at DESC);
            "#,
        ),
        Migration::new(
            2,
            "Create api_keys table",
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES users(id),
                key_identifier TEXT NOT NULL UNIQUE,
                usage_description VARCHAR(200) NOT NULL,
                monthly_cap_tokens BIGINT CHECK (monthly_cap_tokens >= 0),
                shown_once BOOLEAN NOT NULL DEFAULT FALSE,
                revoked_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_api_keys_user ON api_keys(user_id, created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_api_keys_created_at ON api_keys(created_at DESC);
            "#,
        ),
        Migration::new(
            3,
            "Create usage_events table",
            r#"
            CREATE TABLE IF NOT EXISTS usage_events (
                id UUID PRIMARY KEY,
                api_key_id UUID NOT NULL REFERENCES api_keys(id),
                model TEXT NOT NULL,
                tokens BIGINT NOT NULL CHECK (tokens >= 0),
                created_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_usage_events_key_time
                ON usage_events(api_key_id, created_at);
            "#,
        ),
        Migration::new(
            4,
            "Create audit_logs table",
            r#"
            CREATE TABLE IF NOT EXISTS audit_logs (
                id UUID PRIMARY KEY,
                actor_user_id UUID REFERENCES users(id),
                action TEXT NOT NULL,
                api_key_id UUID REFERENCES api_keys(id),
                metadata JSONB NOT NULL DEFAULT '{}'::JSONB,
                created_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_audit_logs_created_at ON audit_logs(created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_audit_logs_action ON audit_logs(action);
            "#,
        ),
        Migration::new(
            5,
            "Create registrations table",
            r#"
            CREATE TABLE IF NOT EXISTS registrations (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES users(id),
                purpose TEXT NOT NULL
                    CHECK (purpose IN ('internal_tooling', 'third_party_integration', 'other')),
                project_name VARCHAR(200),
                contact_email TEXT,
                created_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_registrations_created_at
                ON registrations(created_at DESC);
            "#,
        ),
    ]
}

/// Runs all pending portal migrations. Returns how many were applied.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let mut applied = 0;

    for migration in portal_migrations() {
        if migrator.run_migration(&migration).await? {
            applied += 1;
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creation() {
        let migration = Migration::new(1, "Test migration", "CREATE TABLE test");

        assert_eq!(migration.version, 1);
        assert_eq!(migration.description, "Test migration");
        assert_eq!(migration.up, "CREATE TABLE test");
    }

    #[test]
    fn test_migrations_order() {
        let migrations = portal_migrations();

        assert!(!migrations.is_empty());

        for i in 1..migrations.len() {
            assert!(
                migrations[i].version > migrations[i - 1].version,
                "Migrations should be in ascending order"
            );
        }
    }

    #[test]
    fn test_referenced_tables_are_created_first() {
        let migrations = portal_migrations();
        let position = |table: &str| {
            migrations
                .iter()
                .position(|m| m.up.contains(&format!("CREATE TABLE IF NOT EXISTS {} ", table)))
                .unwrap()
        };

        assert!(position("users") < position("api_keys"));
        assert!(position("api_keys") < position("usage_events"));
        assert!(position("api_keys") < position("audit_logs"));
        assert!(position("users") < position("registrations"));
    }
}
