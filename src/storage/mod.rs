//! Storage layer for Meterbook
//!
//! Provides the local persistent cache (floors with readings, and bills) as
//! JSON files with atomic writes, plus the audit trail of every mutation.

pub mod bills;
pub mod file_io;
pub mod floors;
pub mod init;

pub use bills::BillRepository;
pub use file_io::{read_json, write_json_atomic};
pub use floors::FloorRepository;
pub use init::{initialize_storage, needs_initialization};

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::MeterbookPaths;
use crate::error::MeterbookError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: MeterbookPaths,
    pub floors: FloorRepository,
    pub bills: BillRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: MeterbookPaths) -> Result<Self, MeterbookError> {
        paths.ensure_directories()?;

        Ok(Self {
            floors: FloorRepository::new(paths.floors_file()),
            bills: BillRepository::new(paths.bills_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &MeterbookPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), MeterbookError> {
        self.floors.load()?;
        self.bills.load()?;
        Ok(())
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Record the creation of an entity
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), MeterbookError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update, with a diff of the two states
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), MeterbookError> {
        let diff = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(b), Ok(a)) => generate_diff(&b, &a),
            _ => None,
        };
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff,
        ))
    }

    /// Record several prepared entries at once
    pub fn log_batch(&self, entries: &[AuditEntry]) -> Result<(), MeterbookError> {
        self.audit.log_batch(entries)
    }
}
