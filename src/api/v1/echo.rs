//! Echo endpoint standing in for the downstream inference call.
//!
//! It exercises the full metering contract: cap check before the work, usage
//! recorded after it.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::middleware::RequireApiKey;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::usage::{validate_tokens, CapDecision};

pub const ECHO_MODEL: &str = "echo";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoRequest {
    #[serde(default)]
    pub prompt: String,
    /// Token count reported by the caller; defaults to the prompt's word count
    #[serde(default)]
    pub tokens_used: Option<u64>,
}

impl EchoRequest {
    /// Tokens to meter for this request. Malformed requests never reach the
    /// cap gate.
    pub fn metered_tokens(&self) -> Result<u64, ApiError> {
        if self.prompt.trim().is_empty() {
            return Err(ApiError::bad_request("prompt required").with_param("prompt"));
        }

        let tokens = self
            .tokens_used
            .unwrap_or_else(|| count_tokens(&self.prompt));

        validate_tokens(tokens).map_err(ApiError::from)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoResponse {
    pub completion: String,
    pub model: &'static str,
    pub tokens_used: u64,
}

/// Whitespace-delimited word count
pub fn count_tokens(input: &str) -> u64 {
    input.split_whitespace().count() as u64
}

/// POST /v1/echo
pub async fn echo(
    State(state): State<AppState>,
    RequireApiKey(api_key): RequireApiKey,
    Json(request): Json<EchoRequest>,
) -> Result<Json<EchoResponse>, ApiError> {
    let tokens_used = request.metered_tokens()?;

    if let CapDecision::Deny { used, cap } = state.cap_gate.check_and_pass(&api_key).await? {
        return Err(ApiError::cap_reached(used, cap));
    }

    // Response is already computed; usage write errors are logged only
    if let Err(e) = state
        .usage_meter
        .record(api_key.id(), ECHO_MODEL, tokens_used)
        .await
    {
        error!(api_key_id = %api_key.id(), tokens_used, error = %e, "Failed to record usage");
    }

    info!(api_key_id = %api_key.id(), tokens_used, "Echo request served");

    Ok(Json(EchoResponse {
        completion: request.prompt,
        model: ECHO_MODEL,
        tokens_used,
    }))
}
