//! User settings for Meterbook
//!
//! Display preferences, the default log level and the optional remote list
//! store connection. The remote token is never written here; it is read from
//! `METERBOOK_REMOTE_TOKEN` at startup.

use serde::{Deserialize, Serialize};

use super::paths::MeterbookPaths;
use crate::error::MeterbookError;
use crate::models::money::DEFAULT_CURRENCY_SYMBOL;

/// Environment variable carrying the remote bearer token
pub const REMOTE_TOKEN_ENV: &str = "METERBOOK_REMOTE_TOKEN";

/// Connection details of the remote list store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Site URL, e.g. `https://example.org/sites/building`
    pub base_url: String,

    #[serde(default = "default_floors_list")]
    pub floors_list: String,

    #[serde(default = "default_readings_list")]
    pub readings_list: String,

    #[serde(default = "default_requests_list")]
    pub requests_list: String,
}

impl RemoteSettings {
    /// Remote settings with the default list names
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            floors_list: default_floors_list(),
            readings_list: default_readings_list(),
            requests_list: default_requests_list(),
        }
    }

    /// Bearer token from the environment, if set
    pub fn token_from_env() -> Option<String> {
        std::env::var(REMOTE_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

fn default_floors_list() -> String {
    "Floors".to_string()
}

fn default_readings_list() -> String {
    "Readings".to_string()
}

fn default_requests_list() -> String {
    "ServiceRequests".to_string()
}

/// User settings for Meterbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Remote list store; `None` means local-only mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteSettings>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            log_level: default_log_level(),
            remote: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &MeterbookPaths) -> Result<Self, MeterbookError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                MeterbookError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                MeterbookError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &MeterbookPaths) -> Result<(), MeterbookError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            MeterbookError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| MeterbookError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    /// Format a date with the configured format
    pub fn format_date(&self, date: chrono::NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "₹");
        assert_eq!(settings.log_level, "warn");
        assert!(!settings.is_remote_configured());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MeterbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.remote = Some(RemoteSettings::new("https://example.org/sites/tower/"));
        settings.log_level = "info".into();
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        let remote = loaded.remote.unwrap();
        assert_eq!(remote.base_url, "https://example.org/sites/tower");
        assert_eq!(remote.readings_list, "Readings");
        assert_eq!(loaded.log_level, "info");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"remote":{"base_url":"http://localhost"}}"#).unwrap();
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.date_format, "%Y-%m-%d");
        assert_eq!(settings.remote.unwrap().floors_list, "Floors");
    }

    #[test]
    fn test_format_date() {
        let mut settings = Settings::default();
        settings.date_format = "%d/%m/%Y".into();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 8, 5).unwrap();
        assert_eq!(settings.format_date(date), "05/08/2024");
    }
}
