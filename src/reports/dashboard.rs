//! Dashboard summary
//!
//! Headline figures for the building: consumption, money spent on bills and
//! on maintenance, and the monthly trends behind them.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::consumption::{building_monthly_series, building_total, MonthlyPoint};
use crate::models::{format_units, Bill, Floor, Money, MonthKey, ServiceRequest};

/// Amount paid against bills in one month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPayment {
    pub month: MonthKey,
    pub label: String,
    pub amount: Money,
}

/// Dashboard headline figures
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub total_consumption: f64,
    /// Sum of paid bills' amounts
    pub total_bill_payments: Money,
    /// Sum of maintenance payments across requests
    pub total_service_payments: Money,
    pub sections_monitored: usize,
    pub most_recent_reading: Option<NaiveDate>,
    pub consumption_trend: Vec<MonthlyPoint>,
    /// Paid bills with an amount, oldest month first
    pub bill_payments: Vec<MonthlyPayment>,
}

impl DashboardSummary {
    /// Build the summary; pass an empty slice when requests are unavailable
    pub fn generate(floors: &[Floor], bills: &[Bill], requests: &[ServiceRequest]) -> Self {
        let total_bill_payments = bills
            .iter()
            .filter(|b| b.is_paid())
            .filter_map(|b| b.total_amount)
            .sum();

        let total_service_payments = requests.iter().map(ServiceRequest::payment_amount).sum();

        let most_recent_reading = floors
            .iter()
            .flat_map(|f| f.readings.iter().map(|r| r.date))
            .max();

        let mut by_month: BTreeMap<MonthKey, Money> = BTreeMap::new();
        for bill in bills.iter().filter(|b| b.is_paid()) {
            if let Some(amount) = bill.total_amount.filter(|a| !a.is_zero()) {
                *by_month.entry(bill.month_year).or_default() += amount;
            }
        }
        let bill_payments = by_month
            .into_iter()
            .map(|(month, amount)| MonthlyPayment {
                month,
                label: month.short_label(),
                amount,
            })
            .collect();

        Self {
            total_consumption: building_total(floors),
            total_bill_payments,
            total_service_payments,
            sections_monitored: floors.len(),
            most_recent_reading,
            consumption_trend: building_monthly_series(floors),
            bill_payments,
        }
    }

    /// Format the summary for terminal display
    pub fn format_terminal(&self, currency_symbol: &str) -> String {
        let mut output = String::new();

        output.push_str("Building Dashboard\n");
        output.push_str(&"=".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "{:<26} {} Units\n",
            "Total Consumption:",
            format_units(self.total_consumption)
        ));
        output.push_str(&format!(
            "{:<26} {}\n",
            "Total Bill Payments:",
            self.total_bill_payments.format_with_symbol(currency_symbol)
        ));
        output.push_str(&format!(
            "{:<26} {}\n",
            "Total Service Payments:",
            self.total_service_payments.format_with_symbol(currency_symbol)
        ));
        output.push_str(&format!(
            "{:<26} {}\n",
            "Sections Monitored:", self.sections_monitored
        ));
        output.push_str(&format!(
            "{:<26} {}\n",
            "Most Recent Reading:",
            self.most_recent_reading
                .map(|d| d.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        ));

        if !self.consumption_trend.is_empty() {
            output.push_str("\nMonthly Consumption\n");
            output.push_str(&"-".repeat(50));
            output.push('\n');
            for point in &self.consumption_trend {
                output.push_str(&format!("{:<12} {:>14}\n", point.label, format_units(point.units)));
            }
        }

        if !self.bill_payments.is_empty() {
            output.push_str("\nBill Payments\n");
            output.push_str(&"-".repeat(50));
            output.push('\n');
            for payment in &self.bill_payments {
                output.push_str(&format!(
                    "{:<12} {:>14}\n",
                    payment.label,
                    payment.amount.format_with_symbol(currency_symbol)
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Location, RequestCategory, RequestId, RequestStatus, Resolution, ServicePayment,
    };
    use crate::storage::init::{sample_bills, sample_floors};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn paid_request(amount: i64) -> ServiceRequest {
        ServiceRequest {
            id: RequestId::new(1),
            request_date: date(2024, 8, 1),
            category: RequestCategory::Lift,
            location: Location::new(Some(7), "Lift"),
            description: "Door sensor".into(),
            status: RequestStatus::Resolved,
            resolution: Some(Resolution {
                date: date(2024, 8, 3),
                notes: None,
                payment: Some(ServicePayment {
                    amount: Money::from_minor(amount),
                    date: date(2024, 8, 4),
                    mode: "Cash".into(),
                }),
            }),
        }
    }

    #[test]
    fn test_summary_over_sample_data() {
        let floors = sample_floors().unwrap();
        let bills = sample_bills().unwrap();
        let summary = DashboardSummary::generate(&floors, &bills, &[paid_request(50_000)]);

        assert_eq!(summary.sections_monitored, 9);
        assert_eq!(summary.total_bill_payments, Money::parse("42351.25").unwrap());
        assert_eq!(summary.total_service_payments, Money::from_minor(50_000));
        // The pending August bill is left out of the payment series
        let labels: Vec<&str> = summary.bill_payments.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Jun 2024", "Jul 2024"]);
        assert!(summary.most_recent_reading.is_some());
    }

    #[test]
    fn test_empty_dashboard() {
        let summary = DashboardSummary::generate(&[], &[], &[]);
        assert_eq!(summary.total_consumption, 0.0);
        assert_eq!(summary.most_recent_reading, None);
        assert!(summary.format_terminal("₹").contains("N/A"));
    }
}
