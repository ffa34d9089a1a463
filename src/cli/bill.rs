//! Bill CLI commands

use clap::Subcommand;
use std::path::PathBuf;

use super::parse_optional_date;
use crate::config::settings::Settings;
use crate::display::{format_bill_details, format_bill_list};
use crate::error::MeterbookResult;
use crate::models::{Attachment, BillStatus, BillUpload, MonthKey};
use crate::services::BillService;
use crate::storage::Storage;

/// Bill subcommands
#[derive(Subcommand)]
pub enum BillCommands {
    /// List all bills, newest month first
    List,
    /// Show one bill
    Show {
        /// Billing month (YYYY-MM)
        month: MonthKey,
    },
    /// Upload a bill document for a month
    Upload {
        /// Billing month (YYYY-MM)
        month: MonthKey,
        /// Bill document (PDF or image)
        file: PathBuf,
        /// Amount due, e.g. "24100.00"
        #[arg(short, long)]
        amount: String,
        /// Units billed
        #[arg(short, long)]
        units: String,
        /// Paid or Pending
        #[arg(short, long, default_value = "Pending")]
        status: BillStatus,
        /// Payment date when paid (YYYY-MM-DD)
        #[arg(long)]
        paid_on: Option<String>,
        /// Payment mode when paid, e.g. "UPI"
        #[arg(long)]
        mode: Option<String>,
    },
    /// Change a bill's payment status
    Update {
        /// Billing month (YYYY-MM)
        month: MonthKey,
        /// Paid or Pending
        status: BillStatus,
        /// Payment date (YYYY-MM-DD), required when paid
        #[arg(long)]
        paid_on: Option<String>,
        /// Payment mode, required when paid
        #[arg(long)]
        mode: Option<String>,
    },
    /// Write a bill's document to disk
    SaveAttachment {
        /// Billing month (YYYY-MM)
        month: MonthKey,
        /// Target file or directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

/// Handle a bill command
pub fn handle_bill_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BillCommands,
) -> MeterbookResult<()> {
    let service = BillService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BillCommands::List => {
            let bills = service.list()?;
            println!("{}", format_bill_list(&bills, symbol));
        }

        BillCommands::Show { month } => {
            let bill = service.get(month)?;
            print!("{}", format_bill_details(&bill, settings));
        }

        BillCommands::Upload {
            month,
            file,
            amount,
            units,
            status,
            paid_on,
            mode,
        } => {
            let form = BillUpload {
                month_year: Some(month),
                attachment: Some(Attachment::from_path(&file)?),
                total_amount: amount,
                total_reading: units,
                status,
                payment_date: parse_optional_date(paid_on.as_deref())?,
                payment_mode: mode,
            };
            let bill = service.upload(form)?;
            println!(
                "Uploaded bill for {}: {} ({})",
                bill.month_year.long_label(),
                bill.attachment.file_name,
                bill.status
            );
        }

        BillCommands::Update {
            month,
            status,
            paid_on,
            mode,
        } => {
            let bill = service.update_status(
                month,
                status,
                parse_optional_date(paid_on.as_deref())?,
                mode.as_deref(),
            )?;
            println!(
                "Bill for {} is now {}",
                bill.month_year.long_label(),
                bill.status
            );
        }

        BillCommands::SaveAttachment { month, output } => {
            let path = service.save_attachment(month, &output)?;
            println!("Saved bill document to: {}", path.display());
        }
    }

    Ok(())
}
