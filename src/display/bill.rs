//! Bill display formatting

use tabled::{settings::Style, Table, Tabled};

use super::report::{date_or_dash, separator};
use crate::config::settings::Settings;
use crate::models::{format_units, Bill};

#[derive(Tabled)]
struct BillRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Units")]
    units: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Paid On")]
    paid_on: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "File")]
    file: String,
}

/// Format bills as a table, newest month first as given
pub fn format_bill_list(bills: &[Bill], currency_symbol: &str) -> String {
    if bills.is_empty() {
        return "No bills uploaded.".to_string();
    }

    let rows = bills.iter().map(|bill| BillRow {
        month: bill.month_year.long_label(),
        amount: bill
            .total_amount
            .map(|a| a.format_with_symbol(currency_symbol))
            .unwrap_or_else(|| "-".to_string()),
        units: bill
            .total_reading
            .map(format_units)
            .unwrap_or_else(|| "-".to_string()),
        status: bill.status.to_string(),
        paid_on: date_or_dash(bill.payment_date),
        mode: bill.payment_mode.clone().unwrap_or_else(|| "-".to_string()),
        file: bill.attachment.file_name.clone(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format a single bill
pub fn format_bill_details(bill: &Bill, settings: &Settings) -> String {
    let mut output = String::new();
    output.push_str(&format!("Bill for {}\n", bill.month_year.long_label()));
    output.push_str(&separator(40));
    output.push('\n');
    if let Some(amount) = bill.total_amount {
        output.push_str(&format!(
            "Amount:   {}\n",
            amount.format_with_symbol(&settings.currency_symbol)
        ));
    }
    if let Some(units) = bill.total_reading {
        output.push_str(&format!("Units:    {}\n", format_units(units)));
    }
    output.push_str(&format!("Status:   {}\n", bill.status));
    if bill.is_paid() {
        let paid_on = bill
            .payment_date
            .map(|d| settings.format_date(d))
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!("Paid on:  {}\n", paid_on));
        output.push_str(&format!(
            "Mode:     {}\n",
            bill.payment_mode.as_deref().unwrap_or("-")
        ));
    }
    output.push_str(&format!(
        "File:     {} ({})\n",
        bill.attachment.file_name,
        bill.attachment.mime_type().unwrap_or("no embedded data")
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init::sample_bills;

    #[test]
    fn test_bill_list() {
        let bills = sample_bills().unwrap();
        let text = format_bill_list(&bills, "₹");
        assert!(text.contains("August 2024"));
        assert!(text.contains("Online Banking"));
        assert!(text.contains("Pending"));
        assert_eq!(format_bill_list(&[], "₹"), "No bills uploaded.");
    }

    #[test]
    fn test_pending_bill_details_hide_payment() {
        let bills = sample_bills().unwrap();
        let text = format_bill_details(&bills[0], &Settings::default());
        assert!(text.contains("Status:   Pending"));
        assert!(!text.contains("Paid on"));
        assert!(text.contains("no embedded data"));
    }

    #[test]
    fn test_paid_bill_uses_date_format() {
        let bills = sample_bills().unwrap();
        let paid = bills.iter().find(|b| b.is_paid()).unwrap();
        let mut settings = Settings::default();
        settings.date_format = "%d/%m/%Y".into();
        let text = format_bill_details(paid, &settings);
        let expected = paid.payment_date.unwrap().format("%d/%m/%Y").to_string();
        assert!(text.contains(&format!("Paid on:  {}", expected)));
    }
}
