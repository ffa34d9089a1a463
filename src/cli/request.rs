//! Service request CLI commands
//!
//! Every command here talks to the remote list store.

use clap::{Subcommand, ValueEnum};

use super::{parse_optional_date, today};
use crate::config::settings::Settings;
use crate::display::{format_request_details, format_request_list};
use crate::error::MeterbookResult;
use crate::models::{NewServiceRequest, RequestCategory, RequestId, RequestStatus, ServiceRequestUpdate};
use crate::remote::{ChoiceField, ListStore};
use crate::services::ServiceRequestService;
use crate::storage::Storage;

/// Choice columns that can be listed
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChoiceArg {
    Category,
    Status,
}

impl From<ChoiceArg> for ChoiceField {
    fn from(arg: ChoiceArg) -> Self {
        match arg {
            ChoiceArg::Category => ChoiceField::Category,
            ChoiceArg::Status => ChoiceField::Status,
        }
    }
}

/// Service request subcommands
#[derive(Subcommand)]
pub enum RequestCommands {
    /// List requests, newest first
    List,
    /// Show one request
    Show {
        /// Request ID, e.g. "req-12" or "12"
        id: RequestId,
    },
    /// Raise a new maintenance request
    Raise {
        /// Electrical, Lift, Fire System, Plumbing or General Maintenance
        #[arg(short, long)]
        category: RequestCategory,
        /// Floor name or ID
        #[arg(short, long)]
        location: String,
        /// What is wrong
        #[arg(short, long)]
        description: String,
        /// Request date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Update a request's status and resolution
    Update {
        /// Request ID
        id: RequestId,
        /// Open, In Progress, Resolved or Cancelled
        #[arg(short, long)]
        status: RequestStatus,
        /// Resolution date (YYYY-MM-DD), required when resolved
        #[arg(long)]
        resolved_on: Option<String>,
        /// Resolution notes
        #[arg(long)]
        notes: Option<String>,
        /// Amount paid for the repair
        #[arg(long)]
        amount: Option<String>,
        /// Payment date (YYYY-MM-DD)
        #[arg(long)]
        paid_on: Option<String>,
        /// Payment mode
        #[arg(long)]
        mode: Option<String>,
    },
    /// List the allowed values of a choice column
    Choices {
        #[arg(value_enum)]
        field: ChoiceArg,
    },
}

/// Handle a service request command
pub async fn handle_request_command(
    storage: &Storage,
    settings: &Settings,
    remote: Option<&dyn ListStore>,
    cmd: RequestCommands,
) -> MeterbookResult<()> {
    let service = ServiceRequestService::new(storage, remote);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        RequestCommands::List => {
            let requests = service.list().await?;
            println!("{}", format_request_list(&requests, symbol));
        }

        RequestCommands::Show { id } => {
            let request = service.get(id).await?;
            print!("{}", format_request_details(&request, settings));
        }

        RequestCommands::Raise {
            category,
            location,
            description,
            date,
        } => {
            let form = NewServiceRequest {
                request_date: parse_optional_date(date.as_deref())?,
                category,
                location: service.resolve_location(&location)?,
                description,
            };
            let created = service.raise(form, today()).await?;
            println!(
                "Raised {} ({} at {})",
                created.id, created.category, created.location
            );
        }

        RequestCommands::Update {
            id,
            status,
            resolved_on,
            notes,
            amount,
            paid_on,
            mode,
        } => {
            let update = ServiceRequestUpdate {
                status,
                resolution_date: parse_optional_date(resolved_on.as_deref())?,
                resolution_notes: notes,
                payment_amount: amount,
                payment_date: parse_optional_date(paid_on.as_deref())?,
                payment_mode: mode,
            };
            let updated = service.update(id, &update, today()).await?;
            println!("{} is now {}", updated.id, updated.status);
        }

        RequestCommands::Choices { field } => {
            for choice in service.choices(field.into()).await? {
                println!("{}", choice);
            }
        }
    }

    Ok(())
}
