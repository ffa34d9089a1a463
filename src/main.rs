use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use meterbook::cli::{
    handle_bill_command, handle_config_command, handle_export_command, handle_floor_command,
    handle_report_command, handle_request_command,
};
use meterbook::config::{
    paths::MeterbookPaths,
    settings::{RemoteSettings, Settings},
};
use meterbook::logging::init_logging;
use meterbook::remote::{HttpListStore, ListStore};
use meterbook::services::SyncService;
use meterbook::storage::{initialize_storage, needs_initialization, Storage};

#[derive(Parser)]
#[command(
    name = "meterbook",
    version,
    about = "Building utility ledger",
    long_about = "Meterbook records floor-by-floor electricity meter readings, \
                  rolls them up into consumption reports, and keeps track of \
                  monthly electricity bills and maintenance requests."
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init {
        /// Seed a demonstration building with readings and bills
        #[arg(long)]
        sample: bool,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: Option<meterbook::cli::ConfigCommands>,
    },

    /// Refresh floors and readings from the remote list store
    Sync,

    /// Floors and meter readings
    #[command(subcommand)]
    Floor(meterbook::cli::FloorCommands),

    /// Monthly electricity bills
    #[command(subcommand)]
    Bill(meterbook::cli::BillCommands),

    /// Maintenance service requests
    #[command(subcommand, alias = "req")]
    Request(meterbook::cli::RequestCommands),

    /// Consumption reports
    #[command(subcommand)]
    Report(meterbook::cli::ReportCommands),

    /// Export data to files
    #[command(subcommand)]
    Export(meterbook::cli::ExportCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = MeterbookPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    init_logging(&settings.log_level, cli.verbose);

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    // One client per session, shared by reference
    let http = settings
        .remote
        .clone()
        .map(|remote| HttpListStore::new(remote, RemoteSettings::token_from_env()));
    let remote: Option<&dyn ListStore> = http.as_ref().map(|h| h as &dyn ListStore);

    let needs_data = !matches!(
        cli.command,
        None | Some(Commands::Init { .. }) | Some(Commands::Config { .. })
    );
    if needs_data && needs_initialization(&paths) {
        bail!("Meterbook is not initialized; run `meterbook init` first");
    }

    match cli.command {
        Some(Commands::Init { sample }) => {
            println!("Initializing Meterbook at: {}", paths.base_dir().display());
            initialize_storage(&paths, sample)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            if sample {
                println!();
                println!("A demonstration building with nine sections and three bills was created.");
                println!("Run 'meterbook floor list' to see it.");
            }
        }
        Some(Commands::Config { command }) => {
            handle_config_command(&paths, &mut settings, command)?;
        }
        Some(Commands::Sync) => {
            let Some(remote) = remote else {
                bail!("No remote list store configured; run `meterbook config set-remote <url>`");
            };
            let count = SyncService::new(&storage, remote).refresh_floors().await?;
            println!("Synced {} floors from the remote list store", count);
        }
        Some(Commands::Floor(cmd)) => {
            handle_floor_command(&storage, remote, cmd).await?;
        }
        Some(Commands::Bill(cmd)) => {
            handle_bill_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Request(cmd)) => {
            handle_request_command(&storage, &settings, remote, cmd).await?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, &settings, remote, cmd).await?;
        }
        Some(Commands::Export(cmd)) => {
            handle_export_command(&storage, cmd)?;
        }
        Some(Commands::Audit { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No audit entries yet.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        None => {
            println!("Meterbook - building utility ledger");
            println!();
            println!("Run 'meterbook --help' for usage information.");
            println!("Run 'meterbook init --sample' to try it with demonstration data.");
        }
    }

    Ok(())
}
