//! Registration validation utilities

use thiserror::Error;
use validator::ValidateEmail;

use crate::domain::DomainError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistrationValidationError {
    #[error("Purpose must be one of internal_tooling, third_party_integration, other; got '{0}'")]
    InvalidPurpose(String),

    #[error("Project name is too long. Maximum length is {0} characters.")]
    ProjectNameTooLong(usize),

    #[error("Contact email must be a valid email.")]
    InvalidContactEmail,
}

impl RegistrationValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidPurpose(_) => "purpose",
            Self::ProjectNameTooLong(_) => "projectName",
            Self::InvalidContactEmail => "contactEmail",
        }
    }
}

impl From<RegistrationValidationError> for DomainError {
    fn from(err: RegistrationValidationError) -> Self {
        DomainError::validation(err.field(), err.to_string())
    }
}

pub const MAX_PROJECT_NAME_LENGTH: usize = 200;

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Trim an optional project name. Blank becomes `None`.
pub fn validate_project_name(
    project_name: Option<&str>,
) -> Result<Option<String>, RegistrationValidationError> {
    match non_blank(project_name) {
        None => Ok(None),
        Some(name) if name.chars().count() > MAX_PROJECT_NAME_LENGTH => Err(
            RegistrationValidationError::ProjectNameTooLong(MAX_PROJECT_NAME_LENGTH),
        ),
        Some(name) => Ok(Some(name.to_string())),
    }
}

/// Trim an optional contact email. Blank becomes `None`.
pub fn validate_contact_email(
    contact_email: Option<&str>,
) -> Result<Option<String>, RegistrationValidationError> {
    match non_blank(contact_email) {
        None => Ok(None),
        Some(email) if email.validate_email() => Ok(Some(email.to_string())),
        Some(_) => Err(RegistrationValidationError::InvalidContactEmail),
    }
}
