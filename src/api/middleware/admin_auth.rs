//! Admin console extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

use super::user_auth::{extract_identity, resolve_user, ADMIN_ROLE};

/// Extractor that requires an active user holding the admin role.
///
/// The role comes from the forwarded role header or from the configured list
/// of admin emails.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = extract_identity(&parts.headers)?;
        let user = resolve_user(&identity, state).await?;

        if !identity.has_role(ADMIN_ROLE) && !state.portal.is_admin_email(user.email()) {
            warn!(user_id = %user.id(), "Admin access denied");
            return Err(ApiError::forbidden("Admin access required"));
        }

        debug!(user_id = %user.id(), "Admin access granted");

        Ok(RequireAdmin(user))
    }
}
