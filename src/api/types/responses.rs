//! Response bodies for the portal and admin endpoints
//!
//! None of these carry a key secret except `IssuedApiKeyResponse`, which is
//! produced once, by the issuing request.

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::domain::api_key::{ApiKey, ApiKeyStatus};
use crate::domain::registration::{Purpose, Registration};
use crate::domain::user::User;
use crate::infrastructure::api_key::{IssuedApiKey, RevokeResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub id: String,
    pub user_id: String,
    pub key_identifier: String,
    pub usage_description: String,
    pub monthly_cap_tokens: Option<u64>,
    pub shown_once: bool,
    pub status: ApiKeyStatus,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&ApiKey> for ApiKeyResponse {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id().to_string(),
            user_id: key.user_id().to_string(),
            key_identifier: key.key_identifier().to_string(),
            usage_description: key.usage_description().to_string(),
            monthly_cap_tokens: key.monthly_cap_tokens(),
            shown_once: key.shown_once(),
            status: key.status(),
            revoked_at: key.revoked_at(),
            created_at: key.created_at(),
        }
    }
}

/// Issuance response; the only body that ever contains the secret
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedApiKeyResponse {
    #[serde(flatten)]
    pub api_key: ApiKeyResponse,
    pub secret: String,
}

impl From<IssuedApiKey> for IssuedApiKeyResponse {
    fn from(issued: IssuedApiKey) -> Self {
        Self {
            api_key: ApiKeyResponse::from(&issued.api_key),
            secret: issued.secret.expose_secret().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
    pub api_key: ApiKeyResponse,
    pub already_revoked: bool,
}

impl From<RevokeResult> for RevokeResponse {
    fn from(result: RevokeResult) -> Self {
        Self {
            api_key: ApiKeyResponse::from(result.api_key()),
            already_revoked: !result.newly_revoked(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub entra_id: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            entra_id: user.entra_id().to_string(),
            email: user.email().to_string(),
            is_active: user.is_active(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub user_id: String,
    pub purpose: Purpose,
    pub project_name: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Registration> for RegistrationResponse {
    fn from(registration: &Registration) -> Self {
        Self {
            id: registration.id.to_string(),
            user_id: registration.user_id.to_string(),
            purpose: registration.purpose,
            project_name: registration.project_name.clone(),
            contact_email: registration.contact_email.clone(),
            created_at: registration.created_at,
        }
    }
}
