//! In-memory secret vault for tests and local development

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

use crate::domain::vault::{SecretVault, VaultEntry};
use crate::domain::DomainError;

/// Versioned in-process store. Each write to a name bumps its version.
#[derive(Debug, Default)]
pub struct InMemoryVault {
    entries: Arc<RwLock<HashMap<String, Vec<SecretString>>>>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct entry names
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Whether the latest version of `name` equals `value`
    pub async fn holds(&self, name: &str, value: &str) -> bool {
        self.entries
            .read()
            .await
            .get(name)
            .and_then(|versions| versions.last())
            .is_some_and(|secret| secret.expose_secret() == value)
    }
}

#[async_trait]
impl SecretVault for InMemoryVault {
    async fn store(&self, name: &str, value: &SecretString) -> Result<VaultEntry, DomainError> {
        let mut entries = self.entries.write().await;
        let versions = entries.entry(name.to_string()).or_default();
        versions.push(value.clone());

        Ok(VaultEntry::new(name, versions.len().to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_versions_increment_per_name() {
        let vault = InMemoryVault::new();

        let first = vault.store("a", &SecretString::from("one")).await.unwrap();
        let second = vault.store("a", &SecretString::from("two")).await.unwrap();
        let other = vault.store("b", &SecretString::from("x")).await.unwrap();

        assert_eq!(first.version, "1");
        assert_eq!(second.version, "2");
        assert_eq!(other.version, "1");
        assert!(vault.holds("a", "two").await);
        assert_eq!(vault.len().await, 2);
    }
}
