//! API Key validation utilities

use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur during API key validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("Usage description is required.")]
    UsageDescriptionRequired,

    #[error("Usage description is too long. Maximum length is {0} characters.")]
    UsageDescriptionTooLong(usize),

    #[error("Invalid API key id: '{0}'")]
    InvalidId(String),

    #[error("Invalid key identifier: {0}")]
    InvalidKeyIdentifier(String),
}

impl ApiKeyValidationError {
    /// Request field this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::UsageDescriptionRequired | Self::UsageDescriptionTooLong(_) => {
                "usageDescription"
            }
            Self::InvalidId(_) => "keyId",
            Self::InvalidKeyIdentifier(_) => "keyIdentifier",
        }
    }
}

impl From<ApiKeyValidationError> for DomainError {
    fn from(err: ApiKeyValidationError) -> Self {
        DomainError::validation(err.field(), err.to_string())
    }
}

pub const MAX_USAGE_DESCRIPTION_LENGTH: usize = 200;

/// Validate a usage description and return its trimmed form
///
/// Rules:
/// - Cannot be empty after trimming
/// - Maximum 200 characters (counted as chars, not bytes)
pub fn validate_usage_description(description: &str) -> Result<String, ApiKeyValidationError> {
    let trimmed = description.trim();

    if trimmed.is_empty() {
        return Err(ApiKeyValidationError::UsageDescriptionRequired);
    }

    if trimmed.chars().count() > MAX_USAGE_DESCRIPTION_LENGTH {
        return Err(ApiKeyValidationError::UsageDescriptionTooLong(
            MAX_USAGE_DESCRIPTION_LENGTH,
        ));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_description_is_trimmed() {
        assert_eq!(
            validate_usage_description("  nightly batch summaries  ").unwrap(),
            "nightly batch summaries"
        );
    }

    #[test]
    fn test_blank_description_rejected() {
        assert_eq!(
            validate_usage_description(""),
            Err(ApiKeyValidationError::UsageDescriptionRequired)
        );
        assert_eq!(
            validate_usage_description(" \t\n "),
            Err(ApiKeyValidationError::UsageDescriptionRequired)
        );
    }

    #[test]
    fn test_length_boundary() {
        assert!(validate_usage_description(&"a".repeat(200)).is_ok());
        assert_eq!(
            validate_usage_description(&"a".repeat(201)),
            Err(ApiKeyValidationError::UsageDescriptionTooLong(200))
        );
    }

    #[test]
    fn test_length_counts_characters() {
        // 200 multi-byte characters are still within the limit
        assert!(validate_usage_description(&"é".repeat(200)).is_ok());
    }

    #[test]
    fn test_error_field_names_usage_description() {
        let err: DomainError = ApiKeyValidationError::UsageDescriptionRequired.into();
        assert_eq!(err.field(), Some("usageDescription"));
    }
}
