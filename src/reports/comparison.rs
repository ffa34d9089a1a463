//! Period comparison report
//!
//! Compares each floor's consumption against the building for either the
//! whole history or a single calendar month.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use super::consumption::{available_months, building_total, floor_total};
use crate::error::MeterbookError;
use crate::models::{format_units, Floor, MonthKey};

/// The period a comparison covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// All readings, excluding each floor's first
    #[default]
    Overall,
    /// Readings dated in one month, first readings included
    Month(MonthKey),
}

impl Period {
    /// Suffix used in the default export file name
    pub fn file_label(&self) -> String {
        match self {
            Self::Overall => "Overall".to_string(),
            Self::Month(month) => month.long_label().replacen(' ', "_", 1),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => write!(f, "overall"),
            Self::Month(month) => write!(f, "{}", month),
        }
    }
}

impl FromStr for Period {
    type Err = MeterbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("overall") {
            return Ok(Self::Overall);
        }
        s.parse::<MonthKey>().map(Self::Month).map_err(|_| {
            MeterbookError::Validation(format!(
                "Invalid period '{}', expected 'overall' or YYYY-MM",
                s
            ))
        })
    }
}

/// One floor's line in the comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    pub consumption: f64,
    /// Share of the period total, 0 when the total is 0
    pub percentage: f64,
    /// Latest reading value and date; only filled for the overall period
    pub latest: Option<(f64, NaiveDate)>,
}

/// Consumption comparison across floors
#[derive(Debug, Clone)]
pub struct PeriodComparison {
    pub period: Period,
    pub title: String,
    pub total: f64,
    /// Rows sorted by consumption, largest first
    pub rows: Vec<ComparisonRow>,
}

fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

impl PeriodComparison {
    /// Generate the comparison for a period
    pub fn generate(floors: &[Floor], period: Period) -> Self {
        let (title, total, mut rows) = match period {
            Period::Overall => {
                let total = building_total(floors);
                let rows = floors
                    .iter()
                    .map(|floor| {
                        let consumption = floor_total(floor);
                        ComparisonRow {
                            name: floor.name.clone(),
                            consumption,
                            percentage: share(consumption, total),
                            latest: floor.last_reading().map(|r| (r.reading, r.date)),
                        }
                    })
                    .collect::<Vec<_>>();
                ("Overall Consumption Comparison".to_string(), total, rows)
            }
            Period::Month(month) => {
                let per_floor: Vec<(String, f64)> = floors
                    .iter()
                    .map(|floor| (floor.name.clone(), floor.consumption_in(month)))
                    .collect();
                let total: f64 = per_floor.iter().map(|(_, units)| units).sum();
                let rows = per_floor
                    .into_iter()
                    .map(|(name, consumption)| ComparisonRow {
                        name,
                        consumption,
                        percentage: share(consumption, total),
                        latest: None,
                    })
                    .collect::<Vec<_>>();
                (
                    format!("Consumption Comparison for {}", month.long_label()),
                    total,
                    rows,
                )
            }
        };

        rows.sort_by(|a, b| b.consumption.total_cmp(&a.consumption));

        Self {
            period,
            title,
            total,
            rows,
        }
    }

    /// Default period: the most recent month with data, else overall
    pub fn default_period(floors: &[Floor]) -> Period {
        available_months(floors)
            .first()
            .map(|m| Period::Month(m.key))
            .unwrap_or(Period::Overall)
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.title);
        output.push('\n');
        output.push_str(&"=".repeat(72));
        output.push('\n');

        let overall = self.period == Period::Overall;
        if overall {
            output.push_str(&format!(
                "{:<24} {:>14} {:>14} {:>10} {:>7}\n",
                "Section", "Units", "Latest", "Date", "%"
            ));
        } else {
            output.push_str(&format!("{:<24} {:>14} {:>7}\n", "Section", "Units", "%"));
        }
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for row in &self.rows {
            if overall {
                let (value, date) = match row.latest {
                    Some((value, date)) => (format_units(value), date.to_string()),
                    None => ("N/A".to_string(), "N/A".to_string()),
                };
                output.push_str(&format!(
                    "{:<24} {:>14} {:>14} {:>10} {:>6.2}%\n",
                    row.name,
                    format_units(row.consumption),
                    value,
                    date,
                    row.percentage
                ));
            } else {
                output.push_str(&format!(
                    "{:<24} {:>14} {:>6.2}%\n",
                    row.name,
                    format_units(row.consumption),
                    row.percentage
                ));
            }
        }

        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>14}\n",
            "Total",
            format_units(self.total)
        ));
        output
    }
}
