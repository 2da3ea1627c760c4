//! API key admin endpoints

use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MAX_LIST_LIMIT;
use crate::api::middleware::RequireAdmin;
use crate::api::portal::keys::parse_key_id;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiKeyResponse, Json, RevokeResponse};
use crate::domain::usage::month_start;

#[derive(Debug, Default, Deserialize)]
pub struct ListApiKeysParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApiKeysResponse {
    pub api_keys: Vec<ApiKeyResponse>,
    pub total: usize,
}

/// Metered usage of one key in the current UTC month
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyUsageResponse {
    pub api_key_id: String,
    pub period_start: DateTime<Utc>,
    pub as_of: DateTime<Utc>,
    pub tokens_used: u64,
    pub monthly_cap_tokens: Option<u64>,
    /// `None` when the key is uncapped
    pub tokens_remaining: Option<u64>,
}

/// GET /admin/keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(params): Query<ListApiKeysParams>,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(state.portal.admin_list_limit)
        .clamp(1, MAX_LIST_LIMIT);

    debug!(limit, "Admin listing recent API keys");

    let keys = state.api_key_service.list_recent(limit).await?;
    let api_keys: Vec<ApiKeyResponse> = keys.iter().map(ApiKeyResponse::from).collect();

    Ok(Json(ListApiKeysResponse {
        total: api_keys.len(),
        api_keys,
    }))
}

/// GET /admin/keys/{key_id}
pub async fn get_api_key(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(key_id): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let key_id = parse_key_id(&key_id)?;

    let key = state
        .api_key_service
        .get(&key_id)
        .await?
        .ok_or_else(|| ApiError::not_found("API key not found"))?;

    Ok(Json(ApiKeyResponse::from(&key)))
}

/// GET /admin/keys/{key_id}/usage
pub async fn get_api_key_usage(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(key_id): Path<String>,
) -> Result<Json<ApiKeyUsageResponse>, ApiError> {
    let key_id = parse_key_id(&key_id)?;

    let key = state
        .api_key_service
        .get(&key_id)
        .await?
        .ok_or_else(|| ApiError::not_found("API key not found"))?;

    let as_of = Utc::now();
    let tokens_used = state.usage_meter.monthly_total(&key_id, as_of).await?;

    Ok(Json(ApiKeyUsageResponse {
        api_key_id: key_id.to_string(),
        period_start: month_start(as_of),
        as_of,
        tokens_used,
        monthly_cap_tokens: key.monthly_cap_tokens(),
        tokens_remaining: key
            .monthly_cap_tokens()
            .map(|cap| cap.saturating_sub(tokens_used)),
    }))
}

/// POST /admin/keys/{key_id}/revoke
pub async fn revoke_api_key(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(key_id): Path<String>,
) -> Result<Json<RevokeResponse>, ApiError> {
    let key_id = parse_key_id(&key_id)?;

    let result = state.api_key_service.revoke_as_admin(&key_id, &admin).await?;

    Ok(Json(RevokeResponse::from(result)))
}
