//! Monthly token cap gate
//!
//! Read-then-decide: concurrent requests may each observe usage below the cap
//! and all pass, so the cap is a soft limit. The gate never records usage.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::api_key::ApiKey;
use crate::domain::usage::CapDecision;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_cap_decision;

use super::meter::UsageMeter;

#[derive(Debug, Clone)]
pub struct CapGate {
    meter: UsageMeter,
}

impl CapGate {
    pub fn new(meter: UsageMeter) -> Self {
        Self { meter }
    }

    pub async fn check_and_pass(&self, api_key: &ApiKey) -> Result<CapDecision, DomainError> {
        self.check_and_pass_at(api_key, Utc::now()).await
    }

    /// Allow iff the key has no cap or its usage this UTC month is below the cap
    pub async fn check_and_pass_at(
        &self,
        api_key: &ApiKey,
        at: DateTime<Utc>,
    ) -> Result<CapDecision, DomainError> {
        let decision = match api_key.monthly_cap_tokens() {
            None => CapDecision::Allow,
            Some(cap) => {
                let used = self.meter.monthly_total(api_key.id(), at).await?;
                CapDecision::evaluate(used, Some(cap))
            }
        };

        record_cap_decision(&decision);

        match decision {
            CapDecision::Allow => debug!(api_key_id = %api_key.id(), "Cap check passed"),
            CapDecision::Deny { used, cap } => {
                info!(api_key_id = %api_key.id(), used, cap, "Monthly token cap reached")
            }
        }

        Ok(decision)
    }
}
