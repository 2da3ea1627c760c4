use secrecy::SecretString;
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: crate::infrastructure::observability::MetricsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub vault: VaultSettings,
    #[serde(default)]
    pub portal: PortalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Apply pending migrations when the server starts
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VaultBackend {
    #[default]
    Hashicorp,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultSettings {
    #[serde(default)]
    pub backend: VaultBackend,
    pub address: Option<String>,
    pub token: Option<SecretString>,
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
    #[serde(default = "default_vault_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Cap given to newly issued keys; unset means unbounded
    #[serde(default)]
    pub default_monthly_cap_tokens: Option<u64>,
    /// Random bytes per secret (never below 32)
    #[serde(default = "default_secret_bytes")]
    pub secret_bytes: usize,
    #[serde(default)]
    pub secret_prefix: String,
    /// When set, inference calls must carry a matching `x-apim-secret` header
    #[serde(default)]
    pub apim_shared_secret: Option<SecretString>,
    /// Emails granted the admin role in addition to the `admin` role header
    #[serde(default)]
    pub admin_emails: Vec<String>,
    /// Row limit for admin key and registration listings
    #[serde(default = "default_admin_list_limit")]
    pub admin_list_limit: usize,
}

fn default_max_connections() -> u32 {
    10
}

fn default_mount_path() -> String {
    "secret".to_string()
}

fn default_vault_timeout() -> u64 {
    10
}

fn default_secret_bytes() -> usize {
    32
}

fn default_admin_list_limit() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/keyportal".to_string(),
            max_connections: default_max_connections(),
            run_migrations: false,
        }
    }
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            backend: VaultBackend::default(),
            address: None,
            token: None,
            mount_path: default_mount_path(),
            request_timeout_secs: default_vault_timeout(),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            default_monthly_cap_tokens: None,
            secret_bytes: default_secret_bytes(),
            secret_prefix: String::new(),
            apim_shared_secret: None,
            admin_emails: Vec::new(),
            admin_list_limit: default_admin_list_limit(),
        }
    }
}

impl PortalConfig {
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("KEYPORTAL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("portal.admin_emails")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.vault.backend, VaultBackend::Hashicorp);
        assert_eq!(config.portal.secret_bytes, 32);
        assert!(config.portal.default_monthly_cap_tokens.is_none());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "storage": { "backend": "memory" },
            "vault": { "backend": "memory" },
            "portal": { "default_monthly_cap_tokens": 250000, "admin_emails": ["Ops@Example.com"] }
        }))
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.vault.mount_path, "secret");
        assert_eq!(config.portal.default_monthly_cap_tokens, Some(250_000));
        assert!(config.portal.is_admin_email("ops@example.com"));
        assert!(!config.portal.is_admin_email("dev@example.com"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "vault": { "token": "hvs.super-secret" },
            "portal": { "apim_shared_secret": "apim-shared" }
        }))
        .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("hvs.super-secret"));
        assert!(!debug.contains("apim-shared"));
    }
}
