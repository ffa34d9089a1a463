//! Reports module for Meterbook
//!
//! Consumption aggregation, period comparisons and the dashboard summary.
//! Every report is computed from the current floors on demand.

pub mod comparison;
pub mod consumption;
pub mod dashboard;

pub use comparison::{ComparisonRow, Period, PeriodComparison};
pub use consumption::{
    available_months, breakdown_by_floor, building_monthly_series, building_total, floor_total,
    monthly_series, AvailableMonth, FloorShare, MonthlyPoint,
};
pub use dashboard::{DashboardSummary, MonthlyPayment};
