//! Bill repository for JSON storage
//!
//! Bills are keyed by their billing month; at most one bill exists per month.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::MeterbookError;
use crate::models::{Bill, MonthKey};

use super::file_io::{read_json, write_json_atomic};

/// Serializable bill data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub(crate) struct BillData {
    pub(crate) bills: Vec<Bill>,
}

/// Repository for bill persistence
pub struct BillRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<MonthKey, Bill>>,
}

impl BillRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load bills from disk
    pub fn load(&self) -> Result<(), MeterbookError> {
        let file_data: BillData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for bill in file_data.bills {
            data.insert(bill.month_year, bill);
        }

        Ok(())
    }

    /// Save bills to disk, newest month first
    pub fn save(&self) -> Result<(), MeterbookError> {
        let file_data = BillData {
            bills: self.get_all()?,
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get the bill for a month
    pub fn get(&self, month: MonthKey) -> Result<Option<Bill>, MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&month).cloned())
    }

    /// Get all bills sorted by month descending
    pub fn get_all(&self) -> Result<Vec<Bill>, MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.values().rev().cloned().collect())
    }

    /// Insert a new bill, rejecting a second bill for the same month
    pub fn insert(&self, bill: Bill) -> Result<(), MeterbookError> {
        let mut data = self.data.write().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if data.contains_key(&bill.month_year) {
            return Err(MeterbookError::Duplicate {
                entity_type: "Bill",
                identifier: bill.month_year.to_string(),
            });
        }

        data.insert(bill.month_year, bill);
        Ok(())
    }

    /// Replace an existing bill
    pub fn update(&self, bill: Bill) -> Result<(), MeterbookError> {
        let mut data = self.data.write().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        match data.get_mut(&bill.month_year) {
            Some(slot) => {
                *slot = bill;
                Ok(())
            }
            None => Err(MeterbookError::bill_not_found(bill.month_year.to_string())),
        }
    }

    pub fn count(&self) -> Result<usize, MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}
