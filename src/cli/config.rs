//! Configuration CLI commands

use clap::Subcommand;

use crate::config::paths::MeterbookPaths;
use crate::config::settings::{RemoteSettings, Settings, REMOTE_TOKEN_ENV};
use crate::error::MeterbookResult;

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show paths and settings
    Show,
    /// Point Meterbook at a remote list store
    SetRemote {
        /// Site URL
        url: String,
        /// Name of the floors list
        #[arg(long)]
        floors_list: Option<String>,
        /// Name of the readings list
        #[arg(long)]
        readings_list: Option<String>,
        /// Name of the service requests list
        #[arg(long)]
        requests_list: Option<String>,
    },
    /// Switch back to local-only mode
    ClearRemote,
}

fn print_config(paths: &MeterbookPaths, settings: &Settings) {
    println!("Meterbook Configuration");
    println!("=======================");
    println!("Base directory:  {}", paths.base_dir().display());
    println!("Data directory:  {}", paths.data_dir().display());
    println!("Audit log:       {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    println!("  Currency symbol: {}", settings.currency_symbol);
    println!("  Date format:     {}", settings.date_format);
    println!("  Log level:       {}", settings.log_level);
    match &settings.remote {
        Some(remote) => {
            println!("  Remote store:    {}", remote.base_url);
            println!(
                "    Lists:         {}, {}, {}",
                remote.floors_list, remote.readings_list, remote.requests_list
            );
            let token = if RemoteSettings::token_from_env().is_some() {
                "set"
            } else {
                "not set"
            };
            println!("    {}: {}", REMOTE_TOKEN_ENV, token);
        }
        None => println!("  Remote store:    none (local mode)"),
    }
}

/// Handle a config command; `None` shows the configuration
pub fn handle_config_command(
    paths: &MeterbookPaths,
    settings: &mut Settings,
    cmd: Option<ConfigCommands>,
) -> MeterbookResult<()> {
    match cmd.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => print_config(paths, settings),

        ConfigCommands::SetRemote {
            url,
            floors_list,
            readings_list,
            requests_list,
        } => {
            let mut remote = RemoteSettings::new(url);
            if let Some(name) = floors_list {
                remote.floors_list = name;
            }
            if let Some(name) = readings_list {
                remote.readings_list = name;
            }
            if let Some(name) = requests_list {
                remote.requests_list = name;
            }
            println!("Remote store set to: {}", remote.base_url);
            settings.remote = Some(remote);
            settings.save(paths)?;
            println!("Run 'meterbook sync' to fetch floors and readings.");
        }

        ConfigCommands::ClearRemote => {
            settings.remote = None;
            settings.save(paths)?;
            println!("Remote store cleared; working from the local cache.");
        }
    }

    Ok(())
}
