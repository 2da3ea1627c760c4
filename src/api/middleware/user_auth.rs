//! User identity extractor
//!
//! The authentication handshake happens upstream. The proxy in front of the
//! portal forwards the verified identity in trusted headers, which are read
//! here and synced into the user directory.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

pub const USER_ENTRA_ID_HEADER: &str = "x-user-entra-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Role name that grants the admin console
pub const ADMIN_ROLE: &str = "admin";

/// Identity forwarded by the authentication proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedIdentity {
    pub entra_id: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl ForwardedIdentity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.trim()).filter(|s| !s.is_empty()))
            .map_err(|_| ApiError::bad_request(format!("Invalid {} header encoding", name))),
    }
}

/// Read the forwarded identity headers
pub fn extract_identity(headers: &HeaderMap) -> Result<ForwardedIdentity, ApiError> {
    let entra_id = header_str(headers, USER_ENTRA_ID_HEADER)?;
    let email = header_str(headers, USER_EMAIL_HEADER)?;

    let (Some(entra_id), Some(email)) = (entra_id, email) else {
        return Err(ApiError::unauthorized("Authentication required"));
    };

    let roles = header_str(headers, USER_ROLES_HEADER)?
        .map(|roles| {
            roles
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(ForwardedIdentity {
        entra_id: entra_id.to_string(),
        email: email.to_string(),
        roles,
    })
}

/// Resolve the identity to an active portal user, creating it on first sight
pub(crate) async fn resolve_user(
    identity: &ForwardedIdentity,
    state: &AppState,
) -> Result<User, ApiError> {
    let user = state
        .user_service
        .upsert_from_identity(&identity.entra_id, &identity.email)
        .await
        .map_err(|e| {
            if e.field().is_some() {
                ApiError::unauthorized("Invalid identity")
            } else {
                ApiError::from(e)
            }
        })?;

    if !user.is_active() {
        return Err(ApiError::forbidden("User account is deactivated"));
    }

    Ok(user)
}

/// Extractor that requires an authenticated, active user
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = extract_identity(&parts.headers)?;
        let user = resolve_user(&identity, state).await?;

        debug!(user_id = %user.id(), "Authenticated user");

        Ok(RequireUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, value.parse().unwrap());
        }
        headers
    }

    #[test]
    fn test_extract_identity_with_roles() {
        let identity = extract_identity(&headers(&[
            (USER_ENTRA_ID_HEADER, "sub-1"),
            (USER_EMAIL_HEADER, " dev@example.com "),
            (USER_ROLES_HEADER, "reader, Admin ,"),
        ]))
        .unwrap();

        assert_eq!(identity.entra_id, "sub-1");
        assert_eq!(identity.email, "dev@example.com");
        assert_eq!(identity.roles, vec!["reader", "Admin"]);
        assert!(identity.has_role(ADMIN_ROLE));
    }

    #[test]
    fn test_missing_identity_is_unauthorized() {
        let err = extract_identity(&headers(&[(USER_EMAIL_HEADER, "dev@example.com")]))
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let blank = extract_identity(&headers(&[
            (USER_ENTRA_ID_HEADER, "  "),
            (USER_EMAIL_HEADER, "dev@example.com"),
        ]))
        .unwrap_err();
        assert_eq!(blank.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_roles_are_optional() {
        let identity = extract_identity(&headers(&[
            (USER_ENTRA_ID_HEADER, "sub-1"),
            (USER_EMAIL_HEADER, "dev@example.com"),
        ]))
        .unwrap();

        assert!(identity.roles.is_empty());
        assert!(!identity.has_role(ADMIN_ROLE));
    }
}
