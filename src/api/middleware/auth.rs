//! API key extractor for the metered inference boundary

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::api_key::{ApiKey, KeyIdentifier};
use crate::infrastructure::api_key::constant_time_compare;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const APIM_SECRET_HEADER: &str = "x-apim-secret";

/// Extractor that requires a non-revoked key.
///
/// The gateway presents the key identifier in `x-api-key`. When a shared
/// secret is configured, `x-apim-secret` must match it.
#[derive(Debug, Clone)]
pub struct RequireApiKey(pub ApiKey);

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(expected) = &state.portal.apim_shared_secret {
            verify_gateway_secret(&parts.headers, expected.expose_secret())?;
        }

        let identifier = extract_key_identifier(&parts.headers)?;

        let api_key = state
            .api_key_service
            .find_active_by_identifier(&identifier)
            .await?
            .ok_or_else(|| {
                debug!(key_identifier = %identifier, "Unknown or revoked key presented");
                ApiError::unauthorized("Invalid or revoked API key")
            })?;

        Ok(RequireApiKey(api_key))
    }
}

fn verify_gateway_secret(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    let presented = headers
        .get(APIM_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if constant_time_compare(presented, expected) {
        Ok(())
    } else {
        warn!("Rejected request with missing or wrong gateway secret");
        Err(ApiError::unauthorized("Invalid gateway credentials"))
    }
}

fn extract_key_identifier(headers: &HeaderMap) -> Result<KeyIdentifier, ApiError> {
    let value = headers
        .get(API_KEY_HEADER)
        .ok_or_else(|| ApiError::unauthorized("API key required in 'x-api-key' header"))?
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid x-api-key header encoding"))?;

    value
        .trim()
        .parse()
        .map_err(|_| ApiError::unauthorized("Invalid or revoked API key"))
}
