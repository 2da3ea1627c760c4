//! Usage event repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::UsageEvent;
use crate::domain::api_key::ApiKeyId;
use crate::domain::DomainError;

/// Repository for usage events
#[async_trait]
pub trait UsageRepository: Send + Sync + Debug {
    /// Append a usage event
    async fn append(&self, event: UsageEvent) -> Result<(), DomainError>;

    /// Sum of tokens for a key with `from <= created_at <= to`
    async fn sum_tokens_between(
        &self,
        api_key_id: &ApiKeyId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, DomainError>;
}
