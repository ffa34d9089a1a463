//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod bill;
pub mod config;
pub mod export;
pub mod floor;
pub mod report;
pub mod request;

pub use bill::{handle_bill_command, BillCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use export::{handle_export_command, ExportCommands};
pub use floor::{handle_floor_command, FloorCommands};
pub use report::{handle_report_command, ReportCommands};
pub use request::{handle_request_command, RequestCommands};

use chrono::{Local, NaiveDate};

use crate::error::{MeterbookError, MeterbookResult};

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date(input: &str) -> MeterbookResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        MeterbookError::Validation(format!(
            "Invalid date '{}'. Use format YYYY-MM-DD",
            input
        ))
    })
}

/// Parse an optional `YYYY-MM-DD` argument
pub fn parse_optional_date(input: Option<&str>) -> MeterbookResult<Option<NaiveDate>> {
    input.map(parse_date).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(" 2024-08-10 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 10).unwrap()
        );
        assert!(parse_date("10/08/2024").is_err());
        assert_eq!(parse_optional_date(None).unwrap(), None);
    }
}
