//! Storage factory for runtime backend selection

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::api_key::ApiKeyRepository;
use crate::domain::audit::AuditRepository;
use crate::domain::registration::RegistrationRepository;
use crate::domain::usage::UsageRepository;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::api_key::{InMemoryApiKeyRepository, PostgresApiKeyRepository};
use crate::infrastructure::audit::{InMemoryAuditRepository, PostgresAuditRepository};
use crate::infrastructure::registration::{
    InMemoryRegistrationRepository, PostgresRegistrationRepository,
};
use crate::infrastructure::usage::{InMemoryUsageRepository, PostgresUsageRepository};
use crate::infrastructure::user::{InMemoryUserRepository, PostgresUserRepository};

use super::postgres::ping;

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// The full set of repositories backing the services
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub usage: Arc<dyn UsageRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pool: Option<PgPool>,
}

impl Repositories {
    /// Process-local repositories; data is lost on restart
    pub fn in_memory() -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());

        Self {
            audit: Arc::new(InMemoryAuditRepository::new(users.clone())),
            users,
            api_keys: Arc::new(InMemoryApiKeyRepository::new()),
            usage: Arc::new(InMemoryUsageRepository::new()),
            registrations: Arc::new(InMemoryRegistrationRepository::new()),
            pool: None,
        }
    }

    /// PostgreSQL repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            api_keys: Arc::new(PostgresApiKeyRepository::new(pool.clone())),
            usage: Arc::new(PostgresUsageRepository::new(pool.clone())),
            audit: Arc::new(PostgresAuditRepository::new(pool.clone())),
            registrations: Arc::new(PostgresRegistrationRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub fn storage_type(&self) -> StorageType {
        if self.pool.is_some() {
            StorageType::Postgres
        } else {
            StorageType::InMemory
        }
    }

    /// Verify the backing store is reachable
    pub async fn health_check(&self) -> Result<(), DomainError> {
        match &self.pool {
            Some(pool) => ping(pool).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_parse() {
        assert_eq!(StorageType::parse("memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::parse("In-Memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::parse("postgresql"), Some(StorageType::Postgres));
        assert_eq!(StorageType::parse("mysql"), None);
    }

    #[tokio::test]
    async fn test_in_memory_bundle_is_healthy() {
        let repos = Repositories::in_memory();
        assert_eq!(repos.storage_type(), StorageType::InMemory);
        assert!(repos.health_check().await.is_ok());
    }
}
