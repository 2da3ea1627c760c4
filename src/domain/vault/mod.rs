//! Secret vault port
//!
//! The only place a plaintext key secret is ever written.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use secrecy::SecretString;

use crate::domain::api_key::{ApiKeyValidationError, KeyIdentifier};
use crate::domain::DomainError;

/// Location of a stored secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEntry {
    pub name: String,
    /// Backend version string; empty when the backend does not version
    pub version: String,
}

impl VaultEntry {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn key_identifier(&self) -> Result<KeyIdentifier, ApiKeyValidationError> {
        KeyIdentifier::new(self.name.clone(), self.version.clone())
    }
}

/// Write-only secret store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SecretVault: Send + Sync {
    /// Store `value` under `name`. Implementations must not retry a failed write.
    async fn store(&self, name: &str, value: &SecretString) -> Result<VaultEntry, DomainError>;

    /// Short backend label for logs and health output
    fn backend_name(&self) -> &'static str;
}
