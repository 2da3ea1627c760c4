//! Secret vault backends

mod hashicorp;
mod in_memory;

use std::sync::Arc;

pub use hashicorp::{HashicorpVault, HashicorpVaultConfig};
pub use in_memory::InMemoryVault;

use crate::config::{VaultBackend, VaultSettings};
use crate::domain::vault::SecretVault;
use crate::domain::DomainError;

/// Build the configured vault backend
pub fn create_vault(settings: &VaultSettings) -> Result<Arc<dyn SecretVault>, DomainError> {
    match settings.backend {
        VaultBackend::Memory => {
            tracing::warn!("Using in-memory vault; secrets are lost on restart");
            Ok(Arc::new(InMemoryVault::new()))
        }
        VaultBackend::Hashicorp => {
            let address = settings
                .address
                .clone()
                .ok_or_else(|| DomainError::internal("vault.address is required"))?;
            let token = settings
                .token
                .clone()
                .ok_or_else(|| DomainError::internal("vault.token is required"))?;

            let config = HashicorpVaultConfig::new(address, token)
                .with_mount_path(settings.mount_path.clone())
                .with_request_timeout(std::time::Duration::from_secs(
                    settings.request_timeout_secs,
                ));

            Ok(Arc::new(HashicorpVault::new(config)?))
        }
    }
}
