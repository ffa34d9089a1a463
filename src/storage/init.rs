//! Storage initialization
//!
//! Handles first-run setup and, on request, seeds the demonstration building
//! (nine monitored sections with two months of readings and three bills).

use chrono::NaiveDate;

use crate::config::paths::MeterbookPaths;
use crate::error::{MeterbookError, MeterbookResult};
use crate::models::{Attachment, Bill, BillStatus, Floor, FloorId, Money, MonthKey, Reading, ReadingId};

use super::bills::BillData;
use super::file_io::write_json_atomic;
use super::floors::FloorData;

/// Initialize storage for a fresh installation
///
/// Existing data files are never overwritten.
pub fn initialize_storage(paths: &MeterbookPaths, with_sample: bool) -> MeterbookResult<()> {
    paths.ensure_directories()?;

    if !paths.floors_file().exists() {
        let floors = if with_sample {
            sample_floors()?
        } else {
            Vec::new()
        };
        write_json_atomic(paths.floors_file(), &FloorData { floors })?;
    }

    if !paths.bills_file().exists() {
        let bills = if with_sample {
            sample_bills()?
        } else {
            Vec::new()
        };
        write_json_atomic(paths.bills_file(), &BillData { bills })?;
    }

    Ok(())
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &MeterbookPaths) -> bool {
    !paths.floors_file().exists() || !paths.bills_file().exists()
}

/// (section name, [(reading date, meter value)])
#[rustfmt::skip]
const SAMPLE_FLOORS: &[(&str, [(&str, f64); 5])] = &[
    ("Basement", [("2024-06-15", 23000.0), ("2024-06-28", 23150.0), ("2024-07-10", 23280.0), ("2024-07-25", 23410.0), ("2024-08-05", 23562.0)]),
    ("Ground Floor", [("2024-06-15", 112000.0), ("2024-06-29", 112350.0), ("2024-07-12", 112700.0), ("2024-07-28", 113140.0), ("2024-08-08", 113500.0)]),
    ("1st Floor", [("2024-06-16", 87000.0), ("2024-06-30", 87250.0), ("2024-07-14", 87555.0), ("2024-07-29", 87855.0), ("2024-08-09", 88130.0)]),
    ("2nd Floor", [("2024-06-14", 92000.0), ("2024-06-28", 92205.0), ("2024-07-11", 92410.0), ("2024-07-26", 92635.0), ("2024-08-07", 92815.0)]),
    ("3rd Floor", [("2024-06-18", 76000.0), ("2024-06-29", 76210.0), ("2024-07-15", 76515.0), ("2024-07-30", 76800.0), ("2024-08-10", 76965.0)]),
    ("4th Floor", [("2024-06-13", 65000.0), ("2024-06-27", 65210.0), ("2024-07-13", 65510.0), ("2024-07-28", 65820.0), ("2024-08-09", 65990.0)]),
    ("Lift", [("2024-06-15", 150000.0), ("2024-06-30", 150145.0), ("2024-07-16", 150300.0), ("2024-07-31", 150450.0), ("2024-08-11", 150592.0)]),
    ("Pump Room", [("2024-06-15", 55000.0), ("2024-06-29", 55200.0), ("2024-07-17", 55540.0), ("2024-07-30", 55830.0), ("2024-08-12", 56050.0)]),
    ("Charging Station", [("2024-06-15", 4000.0), ("2024-06-28", 4450.0), ("2024-07-15", 5100.0), ("2024-07-29", 5620.0), ("2024-08-10", 6200.0)]),
];

fn parse_sample_date(raw: &str) -> MeterbookResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| MeterbookError::Storage(format!("Bad sample date {}: {}", raw, e)))
}

/// Floor `n` gets id `n` and readings `n01..n05`
pub(crate) fn sample_floors() -> MeterbookResult<Vec<Floor>> {
    SAMPLE_FLOORS
        .iter()
        .zip(1u64..)
        .map(|((name, readings), floor_no)| {
            let readings = readings
                .iter()
                .zip(1u64..)
                .map(|((date, value), n)| {
                    Ok(Reading::new(
                        ReadingId::new(floor_no * 100 + n),
                        parse_sample_date(date)?,
                        *value,
                        0.0,
                    ))
                })
                .collect::<MeterbookResult<Vec<_>>>()?;
            Ok(Floor::with_readings(FloorId::new(floor_no), *name, readings))
        })
        .collect()
}

pub(crate) fn sample_bills() -> MeterbookResult<Vec<Bill>> {
    let placeholder = |name: &str| Attachment {
        file_name: name.to_string(),
        data_url: "#".to_string(),
    };
    let month = |raw: &str| {
        raw.parse::<MonthKey>()
            .map_err(|e| MeterbookError::Storage(e.to_string()))
    };

    Ok(vec![
        Bill {
            month_year: month("2024-08")?,
            attachment: placeholder("august_bill_sample.pdf"),
            total_amount: Some(Money::from_minor(2_410_000)),
            total_reading: Some(2350.0),
            status: BillStatus::Pending,
            payment_date: None,
            payment_mode: None,
        },
        Bill {
            month_year: month("2024-07")?,
            attachment: placeholder("july_bill_sample.pdf"),
            total_amount: Some(Money::from_minor(2_250_075)),
            total_reading: Some(2100.0),
            status: BillStatus::Paid,
            payment_date: Some(parse_sample_date("2024-08-05")?),
            payment_mode: Some("Online Banking".to_string()),
        },
        Bill {
            month_year: month("2024-06")?,
            attachment: placeholder("june_bill_sample.pdf"),
            total_amount: Some(Money::from_minor(1_985_050)),
            total_reading: Some(1850.0),
            status: BillStatus::Paid,
            payment_date: Some(parse_sample_date("2024-07-08")?),
            payment_mode: Some("Credit Card".to_string()),
        },
    ])
}
