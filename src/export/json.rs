//! JSON export
//!
//! Writes the floors and bills of the local cache as a single versioned
//! document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{MeterbookError, MeterbookResult};
use crate::models::{Bill, Floor};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full data export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub floors: Vec<Floor>,

    pub bills: Vec<Bill>,

    pub metadata: ExportMetadata,
}

/// Counts and date range, for a quick look without parsing everything
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub floor_count: usize,
    pub reading_count: usize,
    pub bill_count: usize,
    pub earliest_reading: Option<String>,
    pub latest_reading: Option<String>,
}

impl FullExport {
    /// Snapshot the local cache
    pub fn from_storage(storage: &Storage) -> MeterbookResult<Self> {
        let floors = storage.floors.get_all()?;
        let bills = storage.bills.get_all()?;

        let dates = || floors.iter().flat_map(|f| f.readings.iter().map(|r| r.date));
        let metadata = ExportMetadata {
            floor_count: floors.len(),
            reading_count: floors.iter().map(|f| f.readings.len()).sum(),
            bill_count: bills.len(),
            earliest_reading: dates().min().map(|d| d.to_string()),
            latest_reading: dates().max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            floors,
            bills,
            metadata,
        })
    }
}

/// Export floors and bills to JSON
pub fn export_full_json<W: Write>(
    storage: &Storage,
    writer: &mut W,
    pretty: bool,
) -> MeterbookResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| MeterbookError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MeterbookPaths;
    use crate::storage::initialize_storage;
    use tempfile::TempDir;

    fn create_sample_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MeterbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths, true).unwrap();
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_metadata() {
        let (_temp_dir, storage) = create_sample_storage();
        let export = FullExport::from_storage(&storage).unwrap();

        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.floor_count, 9);
        assert_eq!(export.metadata.reading_count, 45);
        assert_eq!(export.metadata.bill_count, 3);
        assert_eq!(export.metadata.earliest_reading.as_deref(), Some("2024-06-13"));
        assert_eq!(export.metadata.latest_reading.as_deref(), Some("2024-08-12"));
    }

    #[test]
    fn test_json_parses_back() {
        let (_temp_dir, storage) = create_sample_storage();
        let mut output = Vec::new();
        export_full_json(&storage, &mut output, true).unwrap();

        let parsed: FullExport = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed.floors, storage.floors.get_all().unwrap());
        assert_eq!(parsed.bills[0].month_year.to_string(), "2024-08");
    }
}
