//! Service request display formatting

use tabled::{settings::Style, Table, Tabled};

use super::report::{separator, truncate};
use crate::config::settings::Settings;
use crate::models::ServiceRequest;

#[derive(Tabled)]
struct RequestRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Paid")]
    paid: String,
}

/// Format requests as a table
pub fn format_request_list(requests: &[ServiceRequest], currency_symbol: &str) -> String {
    if requests.is_empty() {
        return "No service requests found.".to_string();
    }

    let rows = requests.iter().map(|req| RequestRow {
        id: req.id.to_string(),
        date: req.request_date.to_string(),
        category: req.category.to_string(),
        location: req.location.to_string(),
        status: req.status.to_string(),
        description: truncate(&req.description, 40),
        paid: if req.payment_amount().is_zero() {
            "-".to_string()
        } else {
            req.payment_amount().format_with_symbol(currency_symbol)
        },
    });

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format a single request including its resolution block
pub fn format_request_details(request: &ServiceRequest, settings: &Settings) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} {} at {}\n",
        request.id, request.category, request.location
    ));
    output.push_str(&separator(40));
    output.push('\n');
    output.push_str(&format!(
        "Raised:      {}\n",
        settings.format_date(request.request_date)
    ));
    output.push_str(&format!("Status:      {}\n", request.status));
    output.push_str(&format!("Description: {}\n", request.description));

    if let Some(resolution) = &request.resolution {
        output.push_str(&format!(
            "Resolved on: {}\n",
            settings.format_date(resolution.date)
        ));
        if let Some(notes) = &resolution.notes {
            output.push_str(&format!("Notes:       {}\n", notes));
        }
        if let Some(payment) = &resolution.payment {
            output.push_str(&format!(
                "Payment:     {} on {} ({})\n",
                payment.amount.format_with_symbol(&settings.currency_symbol),
                settings.format_date(payment.date),
                payment.mode
            ));
        }
    }
    output
}
