//! Key issuance, listing and revocation for the signed-in user

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, ApiKeyResponse, IssuedApiKeyResponse, Json, RevokeResponse,
};
use crate::domain::api_key::ApiKeyId;
use crate::domain::DomainError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueKeyRequest {
    pub usage_description: String,
}

pub(crate) fn parse_key_id(raw: &str) -> Result<ApiKeyId, ApiError> {
    raw.parse::<ApiKeyId>()
        .map_err(|e| ApiError::from(DomainError::from(e)))
}

/// GET /keys
pub async fn list_keys(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<ApiKeyResponse>>, ApiError> {
    let keys = state.api_key_service.list_for_user(user.id()).await?;

    Ok(Json(keys.iter().map(ApiKeyResponse::from).collect()))
}

/// GET /keys/{key_id}
pub async fn get_key(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(key_id): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let key_id = parse_key_id(&key_id)?;

    let key = state
        .api_key_service
        .get_for_owner(&key_id, user.id())
        .await?
        .ok_or_else(|| ApiError::not_found("API key not found"))?;

    Ok(Json(ApiKeyResponse::from(&key)))
}

/// POST /keys
///
/// The response body is the only place the secret ever appears.
pub async fn issue_key(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<IssueKeyRequest>,
) -> Result<Response, ApiError> {
    debug!(user_id = %user.id(), "Issuing API key");

    let issued = state
        .api_key_service
        .issue(user.id(), &request.usage_description)
        .await?;

    let mut response = (
        StatusCode::CREATED,
        Json(IssuedApiKeyResponse::from(issued)),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

    Ok(response)
}

/// POST /keys/{key_id}/revoke
pub async fn revoke_key(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(key_id): Path<String>,
) -> Result<Json<RevokeResponse>, ApiError> {
    let key_id = parse_key_id(&key_id)?;

    let result = state.api_key_service.revoke(&key_id, user.id()).await?;

    Ok(Json(RevokeResponse::from(result)))
}
