//! Application state shared by the handlers

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::domain::vault::SecretVault;
use crate::infrastructure::api_key::{ApiKeyService, SecretGenerator};
use crate::infrastructure::audit::AuditRecorder;
use crate::infrastructure::registration::RegistrationService;
use crate::infrastructure::storage::Repositories;
use crate::infrastructure::usage::{CapGate, UsageMeter};
use crate::infrastructure::user::UserService;

#[derive(Clone)]
pub struct AppState {
    pub api_key_service: Arc<ApiKeyService>,
    pub user_service: Arc<UserService>,
    pub registration_service: Arc<RegistrationService>,
    pub audit: AuditRecorder,
    pub usage_meter: UsageMeter,
    pub cap_gate: CapGate,
    pub repositories: Repositories,
    pub vault_backend: &'static str,
    pub portal: Arc<PortalConfig>,
}

impl AppState {
    /// Wire every service over one repository set and one vault
    pub fn new(
        repositories: Repositories,
        vault: Arc<dyn SecretVault>,
        portal: PortalConfig,
    ) -> Self {
        let audit = AuditRecorder::new(repositories.audit.clone());
        let usage_meter = UsageMeter::new(repositories.usage.clone());

        let generator = SecretGenerator::new()
            .with_prefix(portal.secret_prefix.clone())
            .with_secret_bytes(portal.secret_bytes);

        let vault_backend = vault.backend_name();

        let api_key_service = ApiKeyService::new(
            repositories.api_keys.clone(),
            repositories.users.clone(),
            vault,
            audit.clone(),
        )
        .with_generator(generator)
        .with_default_monthly_cap(portal.default_monthly_cap_tokens);

        Self {
            api_key_service: Arc::new(api_key_service),
            user_service: Arc::new(UserService::new(repositories.users.clone(), audit.clone())),
            registration_service: Arc::new(RegistrationService::new(
                repositories.registrations.clone(),
                audit.clone(),
            )),
            cap_gate: CapGate::new(usage_meter.clone()),
            usage_meter,
            audit,
            repositories,
            vault_backend,
            portal: Arc::new(portal),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.repositories.storage_type())
            .field("vault", &self.vault_backend)
            .finish_non_exhaustive()
    }
}
