//! Sign-in bookkeeping

use axum::extract::State;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{Json, UserResponse};

/// POST /login
///
/// Called once per sign-in by the front end after the identity handshake.
pub async fn login(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Json<UserResponse> {
    state.user_service.record_login(&user).await;
    Json(UserResponse::from(&user))
}

/// GET /me
pub async fn me(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
