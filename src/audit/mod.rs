//! Audit logging system for Meterbook
//!
//! Records every create and update of floors, readings, bills and service
//! requests with before/after values in an append-only audit log.
//!
//! - `AuditEntry`: one operation with timestamp, entity information, optional
//!   before/after snapshots and an optional bulk `batch_id`.
//! - `AuditLogger`: writes entries to the log file as JSON lines.
//! - `generate_diff`: human-readable summary of the change between states.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
