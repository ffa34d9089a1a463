//! Export module for Meterbook
//!
//! - CSV: the consumption comparison table (spreadsheet-compatible)
//! - JSON: machine-readable export of floors and bills
//! - YAML: human-readable export of floors and bills

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{comparison_file_name, export_comparison_csv};
pub use json::{export_full_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_full_yaml;
