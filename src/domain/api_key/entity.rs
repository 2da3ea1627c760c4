//! API Key entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ApiKeyValidationError;
use crate::domain::user::UserId;

/// Separator between vault entry name and version in a key identifier
pub const KEY_IDENTIFIER_SEPARATOR: &str = "::";

/// API Key identifier (UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(Uuid);

impl ApiKeyId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl FromStr for ApiKeyId {
    type Err = ApiKeyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ApiKeyValidationError::InvalidId(s.to_string()))
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to the vault entry holding a key's secret: `name::version`.
///
/// This is the only handle to the secret the portal keeps; the secret itself is
/// never persisted outside the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyIdentifier {
    name: String,
    version: String,
}

impl KeyIdentifier {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ApiKeyValidationError> {
        let name = name.into();
        let version = version.into();

        if name.is_empty() {
            return Err(ApiKeyValidationError::InvalidKeyIdentifier(
                "vault entry name cannot be empty".to_string(),
            ));
        }

        if name.contains(KEY_IDENTIFIER_SEPARATOR) || version.contains(KEY_IDENTIFIER_SEPARATOR) {
            return Err(ApiKeyValidationError::InvalidKeyIdentifier(format!(
                "name and version cannot contain '{}'",
                KEY_IDENTIFIER_SEPARATOR
            )));
        }

        Ok(Self { name, version })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vault version; empty when the backend does not version entries
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl FromStr for KeyIdentifier {
    type Err = ApiKeyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, version) = s.split_once(KEY_IDENTIFIER_SEPARATOR).ok_or_else(|| {
            ApiKeyValidationError::InvalidKeyIdentifier(format!(
                "missing '{}' separator",
                KEY_IDENTIFIER_SEPARATOR
            ))
        })?;

        Self::new(name, version)
    }
}

impl TryFrom<String> for KeyIdentifier {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyIdentifier> for String {
    fn from(id: KeyIdentifier) -> Self {
        id.to_string()
    }
}

impl std::fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.name, KEY_IDENTIFIER_SEPARATOR, self.version)
    }
}

/// Lifecycle state of an API key, derived from `revoked_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyStatus {
    Active,
    Revoked,
}

/// API Key entity
///
/// Holds metadata only. `revoked_at` moves from `None` to `Some` once and is
/// never cleared; keys are never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    id: ApiKeyId,
    user_id: UserId,
    key_identifier: KeyIdentifier,
    usage_description: String,
    /// Monthly token ceiling; `None` means unbounded
    monthly_cap_tokens: Option<u64>,
    /// Set when the secret was revealed at creation
    shown_once: bool,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Create a freshly issued key. The secret has been revealed exactly once.
    pub fn new(
        user_id: UserId,
        key_identifier: KeyIdentifier,
        usage_description: impl Into<String>,
        monthly_cap_tokens: Option<u64>,
    ) -> Self {
        Self {
            id: ApiKeyId::generate(),
            user_id,
            key_identifier,
            usage_description: usage_description.into(),
            monthly_cap_tokens,
            shown_once: true,
            revoked_at: None,
            created_at: Utc::now(),
        }
    }

    /// Rebuild a key from persisted state
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ApiKeyId,
        user_id: UserId,
        key_identifier: KeyIdentifier,
        usage_description: String,
        monthly_cap_tokens: Option<u64>,
        shown_once: bool,
        revoked_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            key_identifier,
            usage_description,
            monthly_cap_tokens,
            shown_once,
            revoked_at,
            created_at,
        }
    }

    // Getters

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn key_identifier(&self) -> &KeyIdentifier {
        &self.key_identifier
    }

    pub fn usage_description(&self) -> &str {
        &self.usage_description
    }

    pub fn monthly_cap_tokens(&self) -> Option<u64> {
        self.monthly_cap_tokens
    }

    pub fn shown_once(&self) -> bool {
        self.shown_once
    }

    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> ApiKeyStatus {
        if self.revoked_at.is_some() {
            ApiKeyStatus::Revoked
        } else {
            ApiKeyStatus::Active
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Set `revoked_at` if unset. Returns false when the key was already revoked.
    pub fn mark_revoked(&mut self, at: DateTime<Utc>) -> bool {
        if self.revoked_at.is_some() {
            return false;
        }

        self.revoked_at = Some(at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier() -> KeyIdentifier {
        KeyIdentifier::new("api-user-1700000000000-abcd1234", "7").unwrap()
    }

    #[test]
    fn test_key_identifier_format() {
        assert_eq!(identifier().to_string(), "api-user-1700000000000-abcd1234::7");
    }

    #[test]
    fn test_key_identifier_parse() {
        let parsed: KeyIdentifier = "my-secret::3".parse().unwrap();
        assert_eq!(parsed.name(), "my-secret");
        assert_eq!(parsed.version(), "3");

        let unversioned: KeyIdentifier = "my-secret::".parse().unwrap();
        assert_eq!(unversioned.version(), "");
    }

    #[test]
    fn test_key_identifier_rejects_malformed() {
        assert!("no-separator".parse::<KeyIdentifier>().is_err());
        assert!("::1".parse::<KeyIdentifier>().is_err());
        assert!("a::b::c".parse::<KeyIdentifier>().is_err());
    }

    #[test]
    fn test_key_identifier_serde_as_string() {
        let json = serde_json::to_string(&identifier()).unwrap();
        assert_eq!(json, "\"api-user-1700000000000-abcd1234::7\"");

        let back: KeyIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identifier());
    }

    #[test]
    fn test_new_key_is_active_and_shown_once() {
        let key = ApiKey::new(UserId::generate(), identifier(), "batch jobs", Some(1000));

        assert!(key.shown_once());
        assert_eq!(key.status(), ApiKeyStatus::Active);
        assert_eq!(key.monthly_cap_tokens(), Some(1000));
    }

    #[test]
    fn test_revocation_is_sticky() {
        let mut key = ApiKey::new(UserId::generate(), identifier(), "batch jobs", None);
        let first = Utc::now();

        assert!(key.mark_revoked(first));
        assert!(!key.mark_revoked(first + chrono::Duration::hours(1)));
        assert_eq!(key.revoked_at(), Some(first));
        assert_eq!(key.status(), ApiKeyStatus::Revoked);
    }

    #[test]
    fn test_api_key_id_parse() {
        assert!("not-a-uuid".parse::<ApiKeyId>().is_err());

        let id = ApiKeyId::generate();
        assert_eq!(id.to_string().parse::<ApiKeyId>().unwrap(), id);
    }
}
