//! Key portal
//!
//! Self-service API key issuance for an inference gateway:
//! - Display-once secrets stored only in a secret vault
//! - Idempotent revocation by users and administrators
//! - Monthly token caps enforced at the metered request boundary
//! - Append-only audit trail of every state change

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use crate::api::state::AppState;
use crate::config::StorageBackend;
use crate::infrastructure::storage::{connect_pool, run_migrations, PostgresConfig, Repositories};
use crate::infrastructure::vault::create_vault;
use tracing::{info, warn};

/// Build the application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let repositories = match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on restart");
            Repositories::in_memory()
        }
        StorageBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let pool = connect_pool(
                &PostgresConfig::new(config.database.url.clone())
                    .with_max_connections(config.database.max_connections),
            )
            .await?;
            info!("PostgreSQL connection established");

            if config.database.run_migrations {
                let applied = run_migrations(&pool).await?;
                info!(applied, "Startup migrations complete");
            }

            Repositories::postgres(pool)
        }
    };

    let vault = create_vault(&config.vault)?;
    info!(
        storage = ?repositories.storage_type(),
        vault = vault.backend_name(),
        "Backends ready"
    );

    Ok(AppState::new(repositories, vault, config.portal.clone()))
}
