//! User domain
//!
//! Portal users are created from the trusted identity context and are never
//! deleted, only deactivated.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId};
pub use repository::{UserQuery, UserRepository};
pub use validation::{validate_email, validate_entra_id, UserValidationError};
