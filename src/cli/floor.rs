//! Floor CLI commands
//!
//! Lists floors, shows a floor's history and records meter readings, one
//! floor at a time or many floors sharing a date.

use clap::Subcommand;

use super::{parse_optional_date, today};
use crate::display::{format_floor_details, format_floor_list};
use crate::error::{MeterbookError, MeterbookResult};
use crate::models::{format_units, BulkReadingForm, ReadingCandidate};
use crate::remote::ListStore;
use crate::services::ReadingService;
use crate::storage::Storage;

/// Floor subcommands
#[derive(Subcommand)]
pub enum FloorCommands {
    /// List all floors with their latest reading
    List,
    /// Show a floor's readings and monthly consumption
    Show {
        /// Floor name or ID
        floor: String,
    },
    /// Add a floor (local mode only)
    Add {
        /// Floor name
        name: String,
    },
    /// Record a meter reading for one floor
    AddReading {
        /// Floor name or ID
        floor: String,
        /// Meter value
        value: String,
        /// Reading date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Record readings for several floors on one date
    Bulk {
        /// Entries as FLOOR=VALUE, e.g. "Lift=150700" or "7=150700"
        #[arg(required = true)]
        entries: Vec<String>,
        /// Shared reading date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Handle a floor command
pub async fn handle_floor_command(
    storage: &Storage,
    remote: Option<&dyn ListStore>,
    cmd: FloorCommands,
) -> MeterbookResult<()> {
    let service = ReadingService::new(storage, remote);

    match cmd {
        FloorCommands::List => {
            let floors = service.list_floors()?;
            print!("{}", format_floor_list(&floors));
        }

        FloorCommands::Show { floor } => {
            let found = service.get_floor(&floor)?;
            print!("{}", format_floor_details(&found));
        }

        FloorCommands::Add { name } => {
            let floor = service.add_floor(&name)?;
            println!("Added floor: {} ({})", floor.name, floor.id);
        }

        FloorCommands::AddReading { floor, value, date } => {
            let found = service.get_floor(&floor)?;
            let date = parse_optional_date(date.as_deref())?.unwrap_or_else(today);
            let candidate = ReadingCandidate::parse(date, &value)?;

            let reading = service.add_reading(found.id, candidate, today()).await?;
            println!(
                "Recorded {} for {} on {} ({} units consumed)",
                format_units(reading.reading),
                found.name,
                reading.date,
                format_units(reading.units_consumed)
            );
        }

        FloorCommands::Bulk { entries, date } => {
            let floors = service.list_floors()?;
            let mut form = BulkReadingForm::new(today());
            if let Some(date) = parse_optional_date(date.as_deref())? {
                form.set_date(date, &floors);
            }

            for entry in &entries {
                let (floor, value) = entry.split_once('=').ok_or_else(|| {
                    MeterbookError::Validation(format!(
                        "Invalid entry '{}'. Use FLOOR=VALUE",
                        entry
                    ))
                })?;
                let found = service.get_floor(floor)?;
                form.set_value(found.id, value, &floors)?;
            }

            let outcome = service.add_bulk(&form, today()).await?;
            println!(
                "Recorded {} readings on {} ({})",
                outcome.saved.len(),
                form.date(),
                outcome.batch_id
            );
            for (floor_id, reading) in &outcome.saved {
                let name = floors
                    .iter()
                    .find(|f| f.id == *floor_id)
                    .map(|f| f.name.as_str())
                    .unwrap_or("?");
                println!(
                    "  {:<20} {:>12} ({} units)",
                    name,
                    format_units(reading.reading),
                    format_units(reading.units_consumed)
                );
            }
        }
    }

    Ok(())
}
