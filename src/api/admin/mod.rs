//! Admin console endpoints

pub mod api_keys;
pub mod audit_logs;
pub mod registrations;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Upper bound for the `limit` query parameter on admin listings
pub(crate) const MAX_LIST_LIMIT: usize = 500;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        // User directory
        .route("/users", get(users::list_users))
        .route("/users/{user_id}", get(users::get_user))
        .route("/users/{user_id}/activate", post(users::activate_user))
        .route("/users/{user_id}/deactivate", post(users::deactivate_user))
        // Keys across all users
        .route("/keys", get(api_keys::list_api_keys))
        .route("/keys/{key_id}", get(api_keys::get_api_key))
        .route("/keys/{key_id}/usage", get(api_keys::get_api_key_usage))
        .route("/keys/{key_id}/revoke", post(api_keys::revoke_api_key))
        // Registrations and audit trail
        .route("/registrations", get(registrations::list_registrations))
        .route("/audit-logs", get(audit_logs::list_audit_logs))
}
