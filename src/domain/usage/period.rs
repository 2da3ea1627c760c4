//! Calendar month windows for the token cap

use chrono::{DateTime, Datelike, TimeZone, Utc};

/// First instant of the UTC calendar month containing `at`
pub fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Outcome of a cap check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapDecision {
    Allow,
    Deny { used: u64, cap: u64 },
}

impl CapDecision {
    /// Soft limit: allow while prior usage this month is strictly below the cap.
    /// A single call may push the total past the cap.
    pub fn evaluate(used: u64, cap: Option<u64>) -> Self {
        match cap {
            Some(cap) if used >= cap => Self::Deny { used, cap },
            _ => Self::Allow,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}
