//! Storage infrastructure - backend selection, pooling and migrations

mod factory;
pub mod migrations;
mod postgres;

pub use factory::{Repositories, StorageType};
pub use migrations::{portal_migrations, run_migrations, Migration, PostgresMigrator};
pub use postgres::{connect_pool, ping, PostgresConfig};
