//! Path management for Meterbook
//!
//! ## Path Resolution Order
//!
//! 1. `METERBOOK_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `meterbook`
//!    (`~/.config/meterbook` on Linux, `%APPDATA%\meterbook\config` on Windows)

use directories::ProjectDirs;
use std::path::PathBuf;

use crate::error::MeterbookError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "METERBOOK_DATA_DIR";

/// Manages all paths used by Meterbook
#[derive(Debug, Clone)]
pub struct MeterbookPaths {
    base_dir: PathBuf,
}

impl MeterbookPaths {
    /// Resolve the base directory from the environment or the platform
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, MeterbookError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "meterbook")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    MeterbookError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create MeterbookPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the cached collections
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Cached floors with their reading histories
    pub fn floors_file(&self) -> PathBuf {
        self.data_dir().join("floors.json")
    }

    /// Bill ledger
    pub fn bills_file(&self) -> PathBuf {
        self.data_dir().join("bills.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), MeterbookError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| MeterbookError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| MeterbookError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MeterbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MeterbookPaths::with_base_dir(temp_dir.path().join("nested"));

        assert!(!paths.data_dir().exists());
        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MeterbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
        assert_eq!(
            paths.floors_file(),
            temp_dir.path().join("data").join("floors.json")
        );
        assert_eq!(
            paths.bills_file(),
            temp_dir.path().join("data").join("bills.json")
        );
    }
}
