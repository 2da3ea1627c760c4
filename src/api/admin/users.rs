//! User directory admin endpoints

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiKeyResponse, Json, RegistrationResponse, UserResponse};
use crate::domain::page::{Page, PageRequest};
use crate::domain::user::{UserId, UserQuery};
use crate::domain::DomainError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersParams {
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// A user with everything they own
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub api_keys: Vec<ApiKeyResponse>,
    pub registrations: Vec<RegistrationResponse>,
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<UserId>()
        .map_err(|e| ApiError::from(DomainError::from(e)))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let mut query = UserQuery::new().with_page(PageRequest::new(params.page, params.page_size));
    if let Some(search) = params.search {
        query = query.with_search(search);
    }

    let page = state.user_service.list(&query).await?;

    Ok(Json(page.map(|user| UserResponse::from(&user))))
}

/// GET /admin/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<UserDetailResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;

    let user = state
        .user_service
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let api_keys = state.api_key_service.list_for_user(&user_id).await?;
    let registrations = state.registration_service.list_for_user(&user_id).await?;

    Ok(Json(UserDetailResponse {
        user: UserResponse::from(&user),
        api_keys: api_keys.iter().map(ApiKeyResponse::from).collect(),
        registrations: registrations.iter().map(RegistrationResponse::from).collect(),
    }))
}

/// POST /admin/users/{user_id}/activate
pub async fn activate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let user = state.user_service.activate(&user_id, &admin).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /admin/users/{user_id}/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let user = state.user_service.deactivate(&user_id, &admin).await?;

    Ok(Json(UserResponse::from(&user)))
}
