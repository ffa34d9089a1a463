//! CSV export of the consumption comparison
//!
//! Mirrors the comparison table: one row per section plus a closing Total
//! row. The overall period also carries each section's latest reading.

use std::io::Write;

use crate::error::{MeterbookError, MeterbookResult};
use crate::models::format_units;
use crate::reports::{Period, PeriodComparison};

fn export_err(e: csv::Error) -> MeterbookError {
    MeterbookError::Export(e.to_string())
}

/// Default file name for a comparison export
pub fn comparison_file_name(period: Period) -> String {
    format!("Consumption_Comparison_{}.csv", period.file_label())
}

/// Write the comparison table as CSV
pub fn export_comparison_csv<W: Write>(
    report: &PeriodComparison,
    writer: W,
) -> MeterbookResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let overall = report.period == Period::Overall;

    if overall {
        wtr.write_record([
            "Section Name",
            "Total Consumption (Units)",
            "Latest Reading",
            "Latest Date",
            "Share of Total (%)",
        ])
        .map_err(export_err)?;
    } else {
        wtr.write_record([
            "Section Name",
            "Monthly Consumption (Units)",
            "Share of Total (%)",
        ])
        .map_err(export_err)?;
    }

    for row in &report.rows {
        let consumption = format_units(row.consumption);
        let share = format!("{:.2}", row.percentage);
        if overall {
            let (value, date) = match row.latest {
                Some((value, date)) => (format_units(value), date.to_string()),
                None => ("N/A".to_string(), "N/A".to_string()),
            };
            wtr.write_record([
                row.name.as_str(),
                consumption.as_str(),
                value.as_str(),
                date.as_str(),
                share.as_str(),
            ])
            .map_err(export_err)?;
        } else {
            wtr.write_record([row.name.as_str(), consumption.as_str(), share.as_str()])
                .map_err(export_err)?;
        }
    }

    let total = format_units(report.total);
    if overall {
        wtr.write_record(["Total", total.as_str(), "", "", "100.00"])
            .map_err(export_err)?;
    } else {
        wtr.write_record(["Total", total.as_str(), "100.00"])
            .map_err(export_err)?;
    }

    wtr.flush()
        .map_err(|e| MeterbookError::Export(e.to_string()))?;
    Ok(())
}
