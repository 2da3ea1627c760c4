//! Usage metering domain
//!
//! Per-key usage events and the calendar-month token cap evaluated over them.

mod event;
mod period;
mod repository;

pub use event::{validate_tokens, UsageEvent, UsageEventId, MAX_EVENT_TOKENS};
pub use period::{month_start, CapDecision};
pub use repository::UsageRepository;
