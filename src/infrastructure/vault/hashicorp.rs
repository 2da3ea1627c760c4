//! HashiCorp Vault KV v2 secret store

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::vault::{SecretVault, VaultEntry};
use crate::domain::DomainError;

/// Vault client configuration
#[derive(Clone)]
pub struct HashicorpVaultConfig {
    pub address: String,
    pub token: SecretString,
    pub mount_path: String,
    pub request_timeout: Duration,
}

impl HashicorpVaultConfig {
    pub fn new(address: impl Into<String>, token: SecretString) -> Self {
        Self {
            address: address.into(),
            token,
            mount_path: "secret".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = mount_path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for HashicorpVaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashicorpVaultConfig")
            .field("address", &self.address)
            .field("mount_path", &self.mount_path)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// KV v2 writer. A failed write is reported once and never retried.
#[derive(Debug)]
pub struct HashicorpVault {
    config: HashicorpVaultConfig,
    http_client: reqwest::Client,
}

impl HashicorpVault {
    pub fn new(config: HashicorpVaultConfig) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DomainError::vault(format!("Failed to build Vault client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn data_url(&self, name: &str) -> String {
        format!(
            "{}/v1/{}/data/{}",
            self.config.address.trim_end_matches('/'),
            self.config.mount_path.trim_matches('/'),
            name
        )
    }
}

#[derive(Deserialize)]
struct WriteResponse {
    data: WriteMetadata,
}

#[derive(Deserialize)]
struct WriteMetadata {
    version: u64,
}

#[async_trait]
impl SecretVault for HashicorpVault {
    async fn store(&self, name: &str, value: &SecretString) -> Result<VaultEntry, DomainError> {
        let response = self
            .http_client
            .post(self.data_url(name))
            .header("X-Vault-Token", self.config.token.expose_secret())
            .json(&json!({ "data": { "value": value.expose_secret() } }))
            .send()
            .await
            .map_err(|e| {
                // reqwest errors carry the URL, never the body
                warn!(vault_entry = %name, error = %e, "Vault write failed");
                DomainError::vault(format!("Vault request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(vault_entry = %name, status = %status, "Vault rejected write");
            return Err(DomainError::vault(format!(
                "Vault returned error status: {}",
                status
            )));
        }

        let body: WriteResponse = response.json().await.map_err(|e| {
            DomainError::vault(format!("Failed to parse Vault response: {}", e))
        })?;

        debug!(vault_entry = %name, version = body.data.version, "Secret stored in Vault");

        Ok(VaultEntry::new(name, body.data.version.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "hashicorp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn vault_for(server: &MockServer) -> HashicorpVault {
        HashicorpVault::new(
            HashicorpVaultConfig::new(server.uri(), SecretString::from("root-token"))
                .with_mount_path("kv"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_store_returns_version() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/kv/data/api-user-1"))
            .and(header("X-Vault-Token", "root-token"))
            .and(body_json(json!({ "data": { "value": "s3cret" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "created_time": "2024-01-01T00:00:00Z",
                    "deletion_time": "",
                    "destroyed": false,
                    "version": 3
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let entry = vault_for(&server)
            .store("api-user-1", &SecretString::from("s3cret"))
            .await
            .unwrap();

        assert_eq!(entry, VaultEntry::new("api-user-1", "3"));
        assert_eq!(entry.key_identifier().unwrap().to_string(), "api-user-1::3");
    }

    #[tokio::test]
    async fn test_error_status_is_vault_error_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = vault_for(&server)
            .store("api-user-1", &SecretString::from("s3cret"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Vault { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .mount(&server)
            .await;

        let result = vault_for(&server)
            .store("api-user-1", &SecretString::from("s3cret"))
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_config_debug_hides_token() {
        let config = HashicorpVaultConfig::new("http://vault:8200", SecretString::from("t0k3n"));
        assert!(!format!("{:?}", config).contains("t0k3n"));
    }
}
