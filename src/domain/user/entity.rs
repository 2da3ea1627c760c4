//! User entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::UserValidationError;

/// User identifier (UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
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

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId(s.to_string()))
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A portal user, keyed by their external (Entra) identity.
///
/// Users are never deleted; deactivation is the terminal administrative action
/// and is reversible by activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    /// Stable identifier from the external identity provider
    entra_id: String,
    email: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user
    pub fn new(entra_id: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::generate(),
            entra_id: entra_id.into(),
            email: email.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from persisted state
    pub fn restore(
        id: UserId,
        entra_id: String,
        email: String,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            entra_id,
            email,
            is_active,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn entra_id(&self) -> &str {
        &self.entra_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.touch();
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
