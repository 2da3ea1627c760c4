//! User infrastructure module
//!
//! In-memory and PostgreSQL user repositories plus the user directory service.

mod postgres_repository;
mod repository;
mod service;

pub(crate) use postgres_repository::escape_like;
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::UserService;
