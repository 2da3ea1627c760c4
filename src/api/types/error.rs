//! JSON error bodies and the domain error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::domain::DomainError;

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    PermissionError,
    NotFoundError,
    ConflictError,
    RateLimitError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidRequestError => "invalid_request_error",
            Self::AuthenticationError => "authentication_error",
            Self::PermissionError => "permission_error",
            Self::NotFoundError => "not_found_error",
            Self::ConflictError => "conflict_error",
            Self::RateLimitError => "rate_limit_error",
            Self::ServerError => "server_error",
            Self::ServiceUnavailableError => "service_unavailable_error",
        };
        write!(f, "{}", s)
    }
}

/// Error response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    /// Request field the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

pub const CAP_REACHED_CODE: &str = "monthly_token_cap_reached";

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                },
            },
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ApiErrorType::AuthenticationError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ApiErrorType::PermissionError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorType::ConflictError, message)
    }

    /// The key's metered usage this month has reached its cap
    pub fn cap_reached(used: u64, cap: u64) -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            ApiErrorType::RateLimitError,
            format!(
                "Monthly token cap reached: {} of {} tokens used this month",
                used, cap
            ),
        )
        .with_code(CAP_REACHED_CODE)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { field, message } => {
                Self::bad_request(message).with_param(field)
            }
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::Conflict { message } => Self::conflict(message),
            // Infrastructure detail stays in the logs
            other if other.is_retryable() => {
                error!(error = %other, "Infrastructure failure while handling request");
                Self::unavailable("The service is temporarily unavailable. Please retry.")
            }
            other => {
                warn!(error = %other, "Internal error while handling request");
                Self::internal("An internal error occurred.")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_the_field() {
        let err: ApiError =
            DomainError::validation("usageDescription", "Usage description is required.").into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param.as_deref(), Some("usageDescription"));
        assert_eq!(err.response.error.message, "Usage description is required.");
    }

    #[test]
    fn test_infrastructure_errors_are_generic() {
        let storage: ApiError = DomainError::storage("connection refused at 10.0.0.5").into();
        assert_eq!(storage.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!storage.response.error.message.contains("10.0.0.5"));

        let vault: ApiError = DomainError::vault("permission denied for token hvs.x").into();
        assert_eq!(vault.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!vault.response.error.message.contains("hvs.x"));

        let internal: ApiError = DomainError::internal("row insert failed").into();
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!internal.response.error.message.contains("row insert"));
    }

    #[test]
    fn test_only_retryable_errors_are_unavailable() {
        for err in [
            DomainError::storage("pool timed out"),
            DomainError::vault("sealed"),
            DomainError::internal("bad row"),
            DomainError::not_found("missing"),
        ] {
            let retryable = err.is_retryable();
            let api: ApiError = err.into();
            assert_eq!(api.status == StatusCode::SERVICE_UNAVAILABLE, retryable);
        }
    }

    #[test]
    fn test_forbidden_and_conflict_mapping() {
        let forbidden: ApiError = DomainError::forbidden("User account is deactivated").into();
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

        let conflict: ApiError = DomainError::conflict("duplicate key identifier").into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_cap_reached_is_distinct_from_auth_failure() {
        let err = ApiError::cap_reached(1000, 1000);

        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.response.error.code.as_deref(), Some(CAP_REACHED_CODE));
        assert_eq!(err.response.error.error_type, ApiErrorType::RateLimitError);
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::unauthorized("Invalid or revoked API key");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "authentication_error");
        assert!(json["error"].get("param").is_none());
    }
}
