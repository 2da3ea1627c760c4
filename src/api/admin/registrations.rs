//! Registration admin endpoints

use axum::extract::{Query, State};
use serde::Deserialize;

use super::MAX_LIST_LIMIT;
use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, RegistrationResponse};

#[derive(Debug, Default, Deserialize)]
pub struct ListRegistrationsParams {
    pub limit: Option<usize>,
}

/// GET /admin/registrations
pub async fn list_registrations(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(params): Query<ListRegistrationsParams>,
) -> Result<Json<Vec<RegistrationResponse>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(state.portal.admin_list_limit)
        .clamp(1, MAX_LIST_LIMIT);

    let registrations = state.registration_service.list_recent(limit).await?;

    Ok(Json(
        registrations.iter().map(RegistrationResponse::from).collect(),
    ))
}
