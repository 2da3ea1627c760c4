//! Audit domain
//!
//! Append-only record of security-relevant actions.

mod entity;
mod repository;

pub use entity::{AuditAction, AuditLogEntry, AuditLogId, AuditLogView};
pub use repository::{AuditQuery, AuditRepository};
