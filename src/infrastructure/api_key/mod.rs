//! API Key infrastructure implementations
//!
//! Secret generation, the lifecycle service, and in-memory and PostgreSQL
//! repositories.

mod generator;
mod postgres_repository;
mod repository;
mod service;

pub use generator::{constant_time_compare, SecretGenerator, MIN_SECRET_BYTES};
pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, IssuedApiKey, RevokeResult};
