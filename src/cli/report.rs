//! Report CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::report::format_bar;
use crate::error::MeterbookResult;
use crate::models::format_units;
use crate::remote::ListStore;
use crate::reports::{
    available_months, breakdown_by_floor, building_monthly_series, building_total,
    monthly_series, DashboardSummary, Period, PeriodComparison,
};
use crate::services::{BillService, ReadingService, ServiceRequestService};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Dashboard summary of the building
    Summary,
    /// Monthly consumption trend
    Monthly {
        /// Limit to one floor (name or ID)
        #[arg(short, long)]
        floor: Option<String>,
    },
    /// Each floor's share of total consumption
    Breakdown,
    /// Compare floors for a period
    Compare {
        /// "overall" or a month (YYYY-MM); defaults to the latest month
        #[arg(short, long)]
        period: Option<Period>,
    },
    /// Months that have consumption data
    Months,
}

/// Handle a report command
pub async fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    remote: Option<&dyn ListStore>,
    cmd: ReportCommands,
) -> MeterbookResult<()> {
    let floors = ReadingService::new(storage, remote).list_floors()?;

    match cmd {
        ReportCommands::Summary => {
            let bills = BillService::new(storage).list()?;
            let requests = match remote {
                Some(_) => ServiceRequestService::new(storage, remote).list().await?,
                None => Vec::new(),
            };
            let summary = DashboardSummary::generate(&floors, &bills, &requests);
            print!("{}", summary.format_terminal(&settings.currency_symbol));
        }

        ReportCommands::Monthly { floor } => {
            let (title, series) = match floor {
                Some(identifier) => {
                    let found = ReadingService::new(storage, remote).get_floor(&identifier)?;
                    (found.name.clone(), monthly_series(&found))
                }
                None => ("Building".to_string(), building_monthly_series(&floors)),
            };

            println!("{} Monthly Consumption", title);
            if series.is_empty() {
                println!("No consumption recorded yet.");
                return Ok(());
            }
            let max = series.iter().map(|p| p.units).fold(0.0, f64::max);
            for point in &series {
                println!(
                    "{:<9} {} {:>12}",
                    point.label,
                    format_bar(point.units, max, 30),
                    format_units(point.units)
                );
            }
        }

        ReportCommands::Breakdown => {
            let total = building_total(&floors);
            let breakdown = breakdown_by_floor(&floors);
            if breakdown.is_empty() {
                println!("No consumption recorded yet.");
                return Ok(());
            }
            println!("Overall Consumption Breakdown");
            for share in &breakdown {
                println!(
                    "{:<20} {:>12} {:>6.1}%",
                    share.name,
                    format_units(share.units),
                    if total > 0.0 { share.units / total * 100.0 } else { 0.0 }
                );
            }
        }

        ReportCommands::Compare { period } => {
            let period = period.unwrap_or_else(|| PeriodComparison::default_period(&floors));
            let report = PeriodComparison::generate(&floors, period);
            print!("{}", report.format_terminal());
        }

        ReportCommands::Months => {
            let months = available_months(&floors);
            if months.is_empty() {
                println!("No consumption recorded yet.");
            }
            for month in months {
                println!("{}  {}", month.key, month.label);
            }
        }
    }

    Ok(())
}
