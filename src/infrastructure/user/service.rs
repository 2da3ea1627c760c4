//! User directory service

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::audit::{AuditAction, AuditLogEntry};
use crate::domain::page::Page;
use crate::domain::user::{
    validate_email, validate_entra_id, User, UserId, UserQuery, UserRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::audit::AuditRecorder;

/// User directory: identity sync and admin activation
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    audit: AuditRecorder,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, audit: AuditRecorder) -> Self {
        Self { repository, audit }
    }

    /// Create or refresh the user behind an authenticated identity.
    ///
    /// A deactivated user stays deactivated.
    pub async fn upsert_from_identity(
        &self,
        entra_id: &str,
        email: &str,
    ) -> Result<User, DomainError> {
        validate_entra_id(entra_id)?;
        validate_email(email)?;

        self.repository
            .upsert_by_entra_id(entra_id.trim(), email.trim())
            .await
    }

    /// Record a sign-in for an already resolved user
    pub async fn record_login(&self, user: &User) {
        info!(user_id = %user.id(), "User signed in");

        self.audit
            .record(
                AuditLogEntry::new(AuditAction::Login)
                    .with_actor(*user.id())
                    .with_metadata(json!({ "email": user.email() })),
            )
            .await;
    }

    pub async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError> {
        self.repository.list(query).await
    }

    pub async fn activate(&self, id: &UserId, actor: &User) -> Result<User, DomainError> {
        self.set_active(id, true, actor).await
    }

    pub async fn deactivate(&self, id: &UserId, actor: &User) -> Result<User, DomainError> {
        self.set_active(id, false, actor).await
    }

    async fn set_active(
        &self,
        id: &UserId,
        active: bool,
        actor: &User,
    ) -> Result<User, DomainError> {
        let user = self
            .repository
            .set_active(id, active)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        let action = if active {
            AuditAction::UserActivate
        } else {
            AuditAction::UserDeactivate
        };

        info!(user_id = %id, actor_user_id = %actor.id(), action = %action, "User status changed");

        self.audit
            .record(
                AuditLogEntry::new(action)
                    .with_actor(*actor.id())
                    .with_metadata(json!({
                        "adminActor": actor.email(),
                        "targetUserId": id.to_string(),
                    })),
            )
            .await;

        Ok(user)
    }
}
