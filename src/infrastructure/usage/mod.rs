//! Usage metering infrastructure

mod cap_gate;
mod meter;
mod postgres_repository;
mod repository;

pub use cap_gate::CapGate;
pub use meter::UsageMeter;
pub use postgres_repository::PostgresUsageRepository;
pub use repository::InMemoryUsageRepository;
