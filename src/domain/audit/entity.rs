//! Audit log entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::api_key::ApiKeyId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Audited action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreateKey,
    RevokeKey,
    UserActivate,
    UserDeactivate,
    Login,
    Registration,
}

impl AuditAction {
    pub const ALL: [AuditAction; 6] = [
        Self::CreateKey,
        Self::RevokeKey,
        Self::UserActivate,
        Self::UserDeactivate,
        Self::Login,
        Self::Registration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateKey => "CREATE_KEY",
            Self::RevokeKey => "REVOKE_KEY",
            Self::UserActivate => "USER_ACTIVATE",
            Self::UserDeactivate => "USER_DEACTIVATE",
            Self::Login => "LOGIN",
            Self::Registration => "REGISTRATION",
        }
    }
}

impl FromStr for AuditAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation("action", format!("Unknown audit action: '{}'", s)))
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit log entry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLogId(Uuid);

impl AuditLogId {
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

impl std::fmt::Display for AuditLogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    /// `None` for system-initiated actions
    pub actor_user_id: Option<UserId>,
    pub action: AuditAction,
    pub api_key_id: Option<ApiKeyId>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(action: AuditAction) -> Self {
        Self {
            id: AuditLogId::generate(),
            actor_user_id: None,
            action,
            api_key_id: None,
            metadata: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor_user_id: UserId) -> Self {
        self.actor_user_id = Some(actor_user_id);
        self
    }

    pub fn with_api_key(mut self, api_key_id: ApiKeyId) -> Self {
        self.api_key_id = Some(api_key_id);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Audit entry joined with the actor's current email, for admin listings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogView {
    #[serde(flatten)]
    pub entry: AuditLogEntry,
    pub actor_email: Option<String>,
}
