//! User validation utilities

use thiserror::Error;
use validator::ValidateEmail;

use crate::domain::DomainError;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Invalid user id: '{0}'")]
    InvalidId(String),

    #[error("Identity subject is required.")]
    EmptyEntraId,

    #[error("Identity subject exceeds maximum length of {0} characters")]
    EntraIdTooLong(usize),

    #[error("Identity subject contains invalid character: '{0}'")]
    InvalidEntraIdCharacter(char),

    #[error("Email must be a valid email.")]
    InvalidEmail,
}

impl UserValidationError {
    /// Request field this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId(_) => "id",
            Self::EmptyEntraId | Self::EntraIdTooLong(_) | Self::InvalidEntraIdCharacter(_) => {
                "entraId"
            }
            Self::InvalidEmail => "email",
        }
    }
}

impl From<UserValidationError> for DomainError {
    fn from(err: UserValidationError) -> Self {
        DomainError::validation(err.field(), err.to_string())
    }
}

const MAX_ENTRA_ID_LENGTH: usize = 200;

/// Validate an external identity subject
///
/// Rules:
/// - Cannot be empty after trimming
/// - Maximum 200 characters
/// - No whitespace or control characters
pub fn validate_entra_id(entra_id: &str) -> Result<(), UserValidationError> {
    let entra_id = entra_id.trim();

    if entra_id.is_empty() {
        return Err(UserValidationError::EmptyEntraId);
    }

    if entra_id.chars().count() > MAX_ENTRA_ID_LENGTH {
        return Err(UserValidationError::EntraIdTooLong(MAX_ENTRA_ID_LENGTH));
    }

    if let Some(c) = entra_id
        .chars()
        .find(|c| c.is_whitespace() || c.is_control())
    {
        return Err(UserValidationError::InvalidEntraIdCharacter(c));
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.trim().validate_email() {
        Ok(())
    } else {
        Err(UserValidationError::InvalidEmail)
    }
}
