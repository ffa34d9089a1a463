//! Floor display formatting
//!
//! Lists floors with their latest reading and totals, and shows a single
//! floor's reading history with its monthly consumption.

use tabled::{settings::Style, Table, Tabled};

use super::report::{format_bar, separator};
use crate::models::{format_units, Floor};
use crate::reports::{floor_total, monthly_series};

/// Format the floor list as a table
pub fn format_floor_list(floors: &[Floor]) -> String {
    if floors.is_empty() {
        return "No floors found.".to_string();
    }

    let name_width = floors
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4}  {:<name_width$}  {:>12}  {:>10}  {:>12}\n",
        "ID",
        "Name",
        "Latest",
        "Date",
        "Consumed",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:->4}  {:-<name_width$}  {:->12}  {:->10}  {:->12}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for floor in floors {
        let (latest, date) = match floor.last_reading() {
            Some(r) => (format_units(r.reading), r.date.to_string()),
            None => ("N/A".to_string(), "N/A".to_string()),
        };
        output.push_str(&format!(
            "{:>4}  {:<name_width$}  {:>12}  {:>10}  {:>12}\n",
            floor.id.get(),
            floor.name,
            latest,
            date,
            format_units(floor_total(floor)),
            name_width = name_width,
        ));
    }

    output
}

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Reading")]
    reading: String,
    #[tabled(rename = "Units")]
    units: String,
}

/// Format one floor with its readings and monthly consumption
pub fn format_floor_details(floor: &Floor) -> String {
    let mut output = String::new();
    output.push_str(&format!("{} ({})\n", floor.name, floor.id));
    output.push_str(&separator(40));
    output.push('\n');

    if floor.readings.is_empty() {
        output.push_str("No readings recorded.\n");
        return output;
    }

    let rows = floor.readings.iter().enumerate().map(|(i, r)| ReadingRow {
        id: r.id.to_string(),
        date: r.date.to_string(),
        reading: format_units(r.reading),
        // The first reading is the baseline
        units: if i == 0 {
            "-".to_string()
        } else {
            format_units(r.units_consumed)
        },
    });
    output.push_str(&Table::new(rows).with(Style::psql()).to_string());
    output.push('\n');
    output.push_str(&format!(
        "\nTotal consumption: {} units\n",
        format_units(floor_total(floor))
    ));

    let series = monthly_series(floor);
    if !series.is_empty() {
        let max = series.iter().map(|p| p.units).fold(0.0, f64::max);
        output.push_str("\nMonthly consumption\n");
        for point in &series {
            output.push_str(&format!(
                "{:<9} {} {:>10}\n",
                point.label,
                format_bar(point.units, max, 24),
                format_units(point.units)
            ));
        }
    }

    output
}
