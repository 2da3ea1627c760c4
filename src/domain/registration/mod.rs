//! Registration domain

mod entity;
mod repository;
mod validation;

pub use entity::{Purpose, Registration, RegistrationId};
pub use repository::RegistrationRepository;
pub use validation::{
    validate_contact_email, validate_project_name, RegistrationValidationError,
    MAX_PROJECT_NAME_LENGTH,
};
