//! Registration entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::RegistrationValidationError;
use crate::domain::user::UserId;

/// Declared reason for using the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    InternalTooling,
    ThirdPartyIntegration,
    Other,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalTooling => "internal_tooling",
            Self::ThirdPartyIntegration => "third_party_integration",
            Self::Other => "other",
        }
    }
}

impl FromStr for Purpose {
    type Err = RegistrationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "internal_tooling" => Ok(Self::InternalTooling),
            "third_party_integration" => Ok(Self::ThirdPartyIntegration),
            "other" => Ok(Self::Other),
            other => Err(RegistrationValidationError::InvalidPurpose(other.to_string())),
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
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

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Informational registration record. Has no effect on key issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: RegistrationId,
    pub user_id: UserId,
    pub purpose: Purpose,
    pub project_name: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(
        user_id: UserId,
        purpose: Purpose,
        project_name: Option<String>,
        contact_email: Option<String>,
    ) -> Self {
        Self {
            id: RegistrationId::generate(),
            user_id,
            purpose,
            project_name,
            contact_email,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_round_trips_wire_name() {
        for purpose in [
            Purpose::InternalTooling,
            Purpose::ThirdPartyIntegration,
            Purpose::Other,
        ] {
            assert_eq!(purpose.as_str().parse::<Purpose>().unwrap(), purpose);
            assert_eq!(
                serde_json::to_string(&purpose).unwrap(),
                format!("\"{}\"", purpose)
            );
        }
    }

    #[test]
    fn test_unknown_purpose_rejected() {
        assert_eq!(
            "marketing".parse::<Purpose>(),
            Err(RegistrationValidationError::InvalidPurpose("marketing".into()))
        );
    }
}
