//! Usage meter

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::api_key::ApiKeyId;
use crate::domain::usage::{month_start, validate_tokens, UsageEvent, UsageRepository};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_usage_tokens;

/// Records metered consumption and answers monthly totals
#[derive(Debug, Clone)]
pub struct UsageMeter {
    repository: Arc<dyn UsageRepository>,
}

impl UsageMeter {
    pub fn new(repository: Arc<dyn UsageRepository>) -> Self {
        Self { repository }
    }

    /// Append one usage event stamped now
    pub async fn record(
        &self,
        api_key_id: &ApiKeyId,
        model: &str,
        tokens: u64,
    ) -> Result<UsageEvent, DomainError> {
        self.record_at(api_key_id, model, tokens, Utc::now()).await
    }

    /// Append one usage event with an explicit timestamp. Counts above
    /// `MAX_EVENT_TOKENS` are rejected on every backend.
    pub async fn record_at(
        &self,
        api_key_id: &ApiKeyId,
        model: &str,
        tokens: u64,
        at: DateTime<Utc>,
    ) -> Result<UsageEvent, DomainError> {
        let tokens = validate_tokens(tokens)?;
        let event = UsageEvent::at(*api_key_id, model, tokens, at);
        self.repository.append(event.clone()).await?;

        debug!(api_key_id = %api_key_id, model = %model, tokens, "Usage recorded");
        record_usage_tokens(model, tokens);

        Ok(event)
    }

    /// Tokens used by a key from the start of `as_of`'s UTC month through `as_of`
    pub async fn monthly_total(
        &self,
        api_key_id: &ApiKeyId,
        as_of: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        self.repository
            .sum_tokens_between(api_key_id, month_start(as_of), as_of)
            .await
    }
}
