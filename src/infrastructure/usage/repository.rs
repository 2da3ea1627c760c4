//! In-memory usage repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::ApiKeyId;
use crate::domain::usage::{validate_tokens, UsageEvent, UsageRepository, MAX_EVENT_TOKENS};
use crate::domain::DomainError;

/// In-memory implementation of UsageRepository
#[derive(Debug, Default)]
pub struct InMemoryUsageRepository {
    events: Arc<RwLock<Vec<UsageEvent>>>,
}

impl InMemoryUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageRepository for InMemoryUsageRepository {
    async fn append(&self, event: UsageEvent) -> Result<(), DomainError> {
        validate_tokens(event.tokens)?;
        self.events.write().await.push(event);
        Ok(())
    }

    async fn sum_tokens_between(
        &self,
        api_key_id: &ApiKeyId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let events = self.events.read().await;

        Ok(events
            .iter()
            .filter(|e| &e.api_key_id == api_key_id)
            .filter(|e| e.created_at >= from && e.created_at <= to)
            .fold(0u64, |acc, e| acc.saturating_add(e.tokens))
            .min(MAX_EVENT_TOKENS))
    }
}
