//! Registration infrastructure

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresRegistrationRepository;
pub use repository::InMemoryRegistrationRepository;
pub use service::{RegisterRequest, RegistrationService};
