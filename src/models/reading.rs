//! Meter reading model and the reading validator
//!
//! A reading is one meter observation for a floor. New readings are checked
//! against the floor's history before they are accepted: the meter value must
//! keep rising and the dates must keep moving forward without reaching past
//! today.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ReadingId;

/// A single meter observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Unique identifier
    pub id: ReadingId,

    /// Calendar date the meter was read
    pub date: NaiveDate,

    /// Cumulative meter value
    pub reading: f64,

    /// Units consumed since the previous reading (0 for the first reading)
    #[serde(default)]
    pub units_consumed: f64,
}

impl Reading {
    pub fn new(id: ReadingId, date: NaiveDate, reading: f64, units_consumed: f64) -> Self {
        Self {
            id,
            date,
            reading,
            units_consumed,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (+{})",
            self.date.format("%Y-%m-%d"),
            format_units(self.reading),
            format_units(self.units_consumed)
        )
    }
}

/// Consumption attributed to `value` given the previous meter value
///
/// Negative deltas clamp to zero; they only appear when a remote collection
/// hands back readings out of order.
pub fn consumption_delta(previous: Option<f64>, value: f64) -> f64 {
    match previous {
        Some(prev) => (value - prev).max(0.0),
        None => 0.0,
    }
}

/// Format a meter value without a trailing ".0" for whole numbers
pub fn format_units(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Parse raw form input into a meter value (finite and strictly positive)
pub fn parse_reading_value(input: &str) -> Result<f64, ReadingValidationError> {
    let invalid = || ReadingValidationError::InvalidValue {
        input: input.trim().to_string(),
    };
    let value: f64 = input.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

/// A proposed reading that has not been accepted yet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingCandidate {
    pub date: NaiveDate,
    pub value: f64,
}

impl ReadingCandidate {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// Build a candidate from raw form input
    pub fn parse(date: NaiveDate, input: &str) -> Result<Self, ReadingValidationError> {
        Ok(Self::new(date, parse_reading_value(input)?))
    }

    /// Check this candidate against a floor's reading history
    ///
    /// Rules are applied in order: positive finite value, value above the last
    /// reading, date after the last reading's date, date not after `today`.
    pub fn validate(
        &self,
        history: &[Reading],
        today: NaiveDate,
    ) -> Result<(), ReadingValidationError> {
        if !self.value.is_finite() || self.value <= 0.0 {
            return Err(ReadingValidationError::InvalidValue {
                input: format_units(self.value),
            });
        }

        if let Some(last) = last_reading(history) {
            if self.value <= last.reading {
                return Err(ReadingValidationError::NotMonotonic {
                    value: self.value,
                    last: last.reading,
                });
            }
            if self.date <= last.date {
                return Err(ReadingValidationError::DateNotAfterLast {
                    date: self.date,
                    last_date: last.date,
                });
            }
        }

        if self.date > today {
            return Err(ReadingValidationError::FutureDate {
                date: self.date,
                today,
            });
        }

        Ok(())
    }
}

/// The chronologically last reading (the later one wins on equal dates)
pub fn last_reading(history: &[Reading]) -> Option<&Reading> {
    history.iter().max_by_key(|r| r.date)
}

/// Reasons a reading is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ReadingValidationError {
    /// Value is not a number, not finite, or not above zero
    InvalidValue { input: String },
    /// Value does not exceed the last recorded reading
    NotMonotonic { value: f64, last: f64 },
    /// Date is on or before the last recorded reading's date
    DateNotAfterLast {
        date: NaiveDate,
        last_date: NaiveDate,
    },
    /// Date is after today
    FutureDate { date: NaiveDate, today: NaiveDate },
}

impl fmt::Display for ReadingValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { input } => write!(
                f,
                "Please enter a valid positive reading value (got '{}').",
                input
            ),
            Self::NotMonotonic { last, .. } => write!(
                f,
                "Reading must be greater than the last reading of {}.",
                format_units(*last)
            ),
            Self::DateNotAfterLast { last_date, .. } => write!(
                f,
                "Date must be after the last reading date of {}.",
                last_date.format("%Y-%m-%d")
            ),
            Self::FutureDate { .. } => write!(f, "Cannot record a reading for a future date."),
        }
    }
}

impl std::error::Error for ReadingValidationError {}
