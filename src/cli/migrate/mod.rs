//! Migrate command - applies pending schema migrations and exits

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::{connect_pool, run_migrations, PostgresConfig};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let pool = connect_pool(
        &PostgresConfig::new(config.database.url.clone())
            .with_max_connections(config.database.max_connections),
    )
    .await?;

    let applied = run_migrations(&pool).await?;
    info!(applied, "Migrations complete");

    pool.close().await;

    Ok(())
}
