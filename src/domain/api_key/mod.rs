//! API Key domain
//!
//! Metadata for issued credentials. Secrets live only in the vault; the portal
//! keeps the `name::version` reference.

mod entity;
mod repository;
mod validation;

pub use entity::{ApiKey, ApiKeyId, ApiKeyStatus, KeyIdentifier, KEY_IDENTIFIER_SEPARATOR};
pub use repository::{ApiKeyRepository, RevokeOutcome};
pub use validation::{
    validate_usage_description, ApiKeyValidationError, MAX_USAGE_DESCRIPTION_LENGTH,
};
