//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod audit;
pub mod error;
pub mod page;
pub mod registration;
pub mod usage;
pub mod user;
pub mod vault;

pub use api_key::{
    validate_usage_description, ApiKey, ApiKeyId, ApiKeyRepository, ApiKeyStatus,
    ApiKeyValidationError, KeyIdentifier, RevokeOutcome,
};
pub use audit::{AuditAction, AuditLogEntry, AuditLogId, AuditLogView, AuditQuery, AuditRepository};
pub use error::DomainError;
pub use page::{Page, PageRequest};
pub use registration::{
    Purpose, Registration, RegistrationId, RegistrationRepository, RegistrationValidationError,
};
pub use usage::{month_start, CapDecision, UsageEvent, UsageEventId, UsageRepository};
pub use user::{User, UserId, UserQuery, UserRepository, UserValidationError};
pub use vault::{SecretVault, VaultEntry};
