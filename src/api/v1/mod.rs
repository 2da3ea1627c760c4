//! Metered inference boundary

pub mod echo;

use axum::{routing::post, Router};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new().route("/echo", post(echo::echo))
}
