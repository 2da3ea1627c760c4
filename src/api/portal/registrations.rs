//! Self-service registration

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, RegistrationResponse};
use crate::domain::registration::Purpose;
use crate::domain::DomainError;
use crate::infrastructure::registration::RegisterRequest;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub purpose: String,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    let purpose = body
        .purpose
        .parse::<Purpose>()
        .map_err(DomainError::from)?;

    let registration = state
        .registration_service
        .register(
            user.id(),
            RegisterRequest {
                purpose,
                project_name: body.project_name,
                contact_email: body.contact_email,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse::from(&registration)),
    ))
}

/// GET /register
pub async fn list_registrations(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<RegistrationResponse>>, ApiError> {
    let registrations = state.registration_service.list_for_user(user.id()).await?;

    Ok(Json(
        registrations.iter().map(RegistrationResponse::from).collect(),
    ))
}
