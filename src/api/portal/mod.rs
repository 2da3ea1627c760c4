//! Self-service endpoints for signed-in users

pub mod keys;
pub mod registrations;
pub mod session;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

pub fn create_portal_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(session::login))
        .route("/me", get(session::me))
        .route("/keys", get(keys::list_keys).post(keys::issue_key))
        .route("/keys/{key_id}", get(keys::get_key))
        .route("/keys/{key_id}/revoke", post(keys::revoke_key))
        .route(
            "/register",
            get(registrations::list_registrations).post(registrations::register),
        )
}
