//! Usage event entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::api_key::ApiKeyId;
use crate::domain::DomainError;

/// Largest token count one event may carry; counts and monthly totals are
/// stored as SQL `BIGINT`
pub const MAX_EVENT_TOKENS: u64 = i64::MAX as u64;

/// Reject token counts the usage store cannot hold
pub fn validate_tokens(tokens: u64) -> Result<u64, DomainError> {
    if tokens > MAX_EVENT_TOKENS {
        return Err(DomainError::validation(
            "tokensUsed",
            format!("Token count must not exceed {}", MAX_EVENT_TOKENS),
        ));
    }
    Ok(tokens)
}

/// Usage event identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageEventId(Uuid);

impl UsageEventId {
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

impl std::fmt::Display for UsageEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One metered inference call. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub id: UsageEventId,
    pub api_key_id: ApiKeyId,
    pub model: String,
    pub tokens: u64,
    pub created_at: DateTime<Utc>,
}

impl UsageEvent {
    pub fn new(api_key_id: ApiKeyId, model: impl Into<String>, tokens: u64) -> Self {
        Self::at(api_key_id, model, tokens, Utc::now())
    }

    /// Create an event with an explicit timestamp
    pub fn at(
        api_key_id: ApiKeyId,
        model: impl Into<String>,
        tokens: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UsageEventId::generate(),
            api_key_id,
            model: model.into(),
            tokens,
            created_at,
        }
    }
}
