//! CLI commands for data export

use clap::Subcommand;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{MeterbookError, MeterbookResult};
use crate::export::{comparison_file_name, export_comparison_csv, export_full_json, export_full_yaml};
use crate::reports::{Period, PeriodComparison};
use crate::storage::Storage;

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export the consumption comparison to CSV
    Comparison {
        /// "overall" or a month (YYYY-MM); defaults to the latest month
        #[arg(short, long)]
        period: Option<Period>,
        /// Output file (default Consumption_Comparison_<period>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export floors and bills to JSON
    Json {
        /// Output file path
        output: PathBuf,
        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Export floors and bills to YAML
    Yaml {
        /// Output file path
        output: PathBuf,
    },
}

fn create_writer(output: &Path) -> MeterbookResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        MeterbookError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

fn finish(mut writer: BufWriter<File>) -> MeterbookResult<()> {
    writer
        .flush()
        .map_err(|e| MeterbookError::Export(e.to_string()))
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> MeterbookResult<()> {
    match cmd {
        ExportCommands::Comparison { period, output } => {
            let floors = storage.floors.get_all()?;
            let period = period.unwrap_or_else(|| PeriodComparison::default_period(&floors));
            let report = PeriodComparison::generate(&floors, period);
            let output = output.unwrap_or_else(|| PathBuf::from(comparison_file_name(period)));

            let mut writer = create_writer(&output)?;
            export_comparison_csv(&report, &mut writer)?;
            finish(writer)?;
            println!("{} exported to: {}", report.title, output.display());
        }

        ExportCommands::Json { output, compact } => {
            let mut writer = create_writer(&output)?;
            export_full_json(storage, &mut writer, !compact)?;
            finish(writer)?;
            println!("Floors and bills exported to: {}", output.display());
        }

        ExportCommands::Yaml { output } => {
            let mut writer = create_writer(&output)?;
            export_full_yaml(storage, &mut writer)?;
            finish(writer)?;
            println!("Floors and bills exported to: {}", output.display());
        }
    }

    Ok(())
}
