//! Registration service

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::audit::{AuditAction, AuditLogEntry};
use crate::domain::registration::{
    validate_contact_email, validate_project_name, Purpose, Registration, RegistrationRepository,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::audit::AuditRecorder;

/// Input for a new registration
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub purpose: Purpose,
    pub project_name: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegistrationService {
    repository: Arc<dyn RegistrationRepository>,
    audit: AuditRecorder,
}

impl RegistrationService {
    pub fn new(repository: Arc<dyn RegistrationRepository>, audit: AuditRecorder) -> Self {
        Self { repository, audit }
    }

    pub async fn register(
        &self,
        user_id: &UserId,
        request: RegisterRequest,
    ) -> Result<Registration, DomainError> {
        let project_name = validate_project_name(request.project_name.as_deref())?;
        let contact_email = validate_contact_email(request.contact_email.as_deref())?;

        let registration = self
            .repository
            .create(Registration::new(
                *user_id,
                request.purpose,
                project_name,
                contact_email,
            ))
            .await?;

        info!(
            registration_id = %registration.id,
            user_id = %user_id,
            purpose = %registration.purpose,
            "Registration recorded"
        );

        self.audit
            .record(
                AuditLogEntry::new(AuditAction::Registration)
                    .with_actor(*user_id)
                    .with_metadata(json!({
                        "registrationId": registration.id.to_string(),
                        "purpose": registration.purpose.as_str(),
                        "projectName": registration.project_name,
                        "contactEmail": registration.contact_email,
                    })),
            )
            .await;

        Ok(registration)
    }

    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Registration>, DomainError> {
        self.repository.list_for_user(user_id).await
    }

    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Registration>, DomainError> {
        self.repository.list_recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::audit::InMemoryAuditRepository;
    use crate::infrastructure::registration::InMemoryRegistrationRepository;
    use crate::infrastructure::user::InMemoryUserRepository;

    fn service() -> (RegistrationService, Arc<InMemoryAuditRepository>) {
        let audit = Arc::new(InMemoryAuditRepository::new(Arc::new(
            InMemoryUserRepository::new(),
        )));
        (
            RegistrationService::new(
                Arc::new(InMemoryRegistrationRepository::new()),
                AuditRecorder::new(audit.clone()),
            ),
            audit,
        )
    }

    #[tokio::test]
    async fn test_register_normalizes_and_audits() {
        let (service, audit) = service();
        let user = UserId::generate();

        let registration = service
            .register(
                &user,
                RegisterRequest {
                    purpose: Purpose::ThirdPartyIntegration,
                    project_name: Some("  CRM sync ".into()),
                    contact_email: Some("   ".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(registration.project_name.as_deref(), Some("CRM sync"));
        assert_eq!(registration.contact_email, None);

        let entries = audit.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Registration);
        assert_eq!(entries[0].metadata["purpose"], "third_party_integration");
        assert_eq!(service.list_for_user(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_contact_email_writes_nothing() {
        let (service, audit) = service();

        let err = service
            .register(
                &UserId::generate(),
                RegisterRequest {
                    purpose: Purpose::Other,
                    project_name: None,
                    contact_email: Some("nope".into()),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("contactEmail"));
        assert!(service.list_recent(10).await.unwrap().is_empty());
        assert!(audit.entries().await.is_empty());
    }
}
