//! Floor model
//!
//! A floor is a monitored section of the building (a storey, the lift, the
//! pump room, ...) that owns its meter-reading history. The history is kept
//! in ascending date order at all times.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{FloorId, ReadingId};
use super::month::MonthKey;
use super::reading::{
    consumption_delta, last_reading, Reading, ReadingCandidate, ReadingValidationError,
};

/// A monitored building section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    /// Unique identifier
    pub id: FloorId,

    /// Display name
    pub name: String,

    /// Readings ordered by date ascending
    #[serde(default)]
    pub readings: Vec<Reading>,
}

impl Floor {
    /// Create a floor with no readings
    pub fn new(id: FloorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            readings: Vec::new(),
        }
    }

    /// Create a floor from readings in any order, normalizing them
    pub fn with_readings(id: FloorId, name: impl Into<String>, readings: Vec<Reading>) -> Self {
        let mut floor = Self {
            id,
            name: name.into(),
            readings,
        };
        floor.normalize();
        floor
    }

    /// The chronologically last reading
    pub fn last_reading(&self) -> Option<&Reading> {
        last_reading(&self.readings)
    }

    /// The chronologically first reading, which carries no consumption
    pub fn first_reading(&self) -> Option<&Reading> {
        self.readings.first()
    }

    /// Readings that contribute to consumption totals (all but the first)
    pub fn consuming_readings(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter().skip(1)
    }

    /// Total units consumed, excluding the first reading
    pub fn total_consumption(&self) -> f64 {
        self.consuming_readings().map(|r| r.units_consumed).sum()
    }

    /// Units consumed by readings dated in `month`
    ///
    /// Month-scoped sums include the first reading when it falls in that month.
    pub fn consumption_in(&self, month: MonthKey) -> f64 {
        self.readings
            .iter()
            .filter(|r| month.contains(r.date))
            .map(|r| r.units_consumed)
            .sum()
    }

    /// Validate a candidate against this floor's history
    pub fn check_reading(
        &self,
        candidate: &ReadingCandidate,
        today: NaiveDate,
    ) -> Result<(), ReadingValidationError> {
        candidate.validate(&self.readings, today)
    }

    /// Validate and append a new reading, keeping date order
    pub fn accept_reading(
        &mut self,
        id: ReadingId,
        candidate: ReadingCandidate,
        today: NaiveDate,
    ) -> Result<&Reading, ReadingValidationError> {
        self.check_reading(&candidate, today)?;
        let units = consumption_delta(self.last_reading().map(|r| r.reading), candidate.value);
        self.insert_sorted(Reading::new(id, candidate.date, candidate.value, units));
        // The validator guarantees the new reading sorts last
        let index = self
            .readings
            .iter()
            .rposition(|r| r.id == id)
            .unwrap_or(self.readings.len() - 1);
        Ok(&self.readings[index])
    }

    /// Push a reading and re-sort by date
    ///
    /// The sort is stable so equal dates keep their insertion order.
    pub fn insert_sorted(&mut self, reading: Reading) {
        self.readings.push(reading);
        self.readings.sort_by_key(|r| r.date);
    }

    /// Sort readings by date and recompute every `units_consumed`
    ///
    /// The first reading gets 0 and negative deltas clamp to 0.
    pub fn normalize(&mut self) {
        self.readings.sort_by_key(|r| r.date);
        let mut previous: Option<f64> = None;
        for reading in &mut self.readings {
            reading.units_consumed = consumption_delta(previous, reading.reading);
            previous = Some(reading.reading);
        }
    }

    /// Check the stored history: strictly increasing dates and values
    pub fn history_is_consistent(&self) -> bool {
        self.readings
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date && pair[0].reading < pair[1].reading)
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 9, 1)
    }

    fn basement() -> Floor {
        Floor::with_readings(
            FloorId::new(1),
            "Basement",
            vec![
                Reading::new(ReadingId::new(101), date(2024, 6, 15), 23000.0, 0.0),
                Reading::new(ReadingId::new(102), date(2024, 6, 28), 23150.0, 0.0),
                Reading::new(ReadingId::new(103), date(2024, 7, 10), 23280.0, 0.0),
                Reading::new(ReadingId::new(104), date(2024, 7, 25), 23410.0, 0.0),
                Reading::new(ReadingId::new(105), date(2024, 8, 5), 23562.0, 0.0),
            ],
        )
    }

    #[test]
    fn test_normalize_recomputes_consumption() {
        let floor = basement();
        let units: Vec<f64> = floor.readings.iter().map(|r| r.units_consumed).collect();
        assert_eq!(units, vec![0.0, 150.0, 130.0, 130.0, 152.0]);
        assert_eq!(floor.total_consumption(), 562.0);
    }

    #[test]
    fn test_normalize_sorts_and_clamps_out_of_order_data() {
        let floor = Floor::with_readings(
            FloorId::new(2),
            "Lift",
            vec![
                Reading::new(ReadingId::new(3), date(2024, 7, 1), 150.0, 0.0),
                Reading::new(ReadingId::new(1), date(2024, 6, 1), 100.0, 0.0),
                Reading::new(ReadingId::new(2), date(2024, 6, 15), 180.0, 0.0),
            ],
        );
        let ids: Vec<u64> = floor.readings.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // 150 after 180 is clamped rather than negative
        assert_eq!(floor.readings[2].units_consumed, 0.0);
        assert_eq!(floor.total_consumption(), 80.0);
    }

    #[test]
    fn test_accept_reading_appends_with_units() {
        let mut floor = basement();
        let reading = floor
            .accept_reading(
                ReadingId::new(106),
                ReadingCandidate::new(date(2024, 8, 10), 23700.0),
                today(),
            )
            .unwrap();
        assert_eq!(reading.units_consumed, 138.0);
        assert_eq!(floor.readings.len(), 6);
        assert_eq!(floor.last_reading().unwrap().id, ReadingId::new(106));
        assert!(floor.history_is_consistent());
    }

    #[test]
    fn test_rejected_reading_leaves_history_untouched() {
        let mut floor = basement();
        let before = floor.clone();
        let result = floor.accept_reading(
            ReadingId::new(106),
            ReadingCandidate::new(date(2024, 8, 4), 23600.0),
            today(),
        );
        assert!(result.is_err());
        assert_eq!(floor, before);
    }

    #[test]
    fn test_first_reading_on_empty_floor_has_zero_units() {
        let mut floor = Floor::new(FloorId::new(9), "Charging Station");
        let reading = floor
            .accept_reading(
                ReadingId::new(1),
                ReadingCandidate::new(date(2024, 6, 15), 4000.0),
                today(),
            )
            .unwrap();
        assert_eq!(reading.units_consumed, 0.0);
        assert_eq!(floor.total_consumption(), 0.0);
    }

    #[test]
    fn test_insert_sorted_is_stable_for_equal_dates() {
        let mut floor = Floor::new(FloorId::new(1), "Basement");
        floor.insert_sorted(Reading::new(ReadingId::new(1), date(2024, 6, 2), 10.0, 0.0));
        floor.insert_sorted(Reading::new(ReadingId::new(2), date(2024, 6, 1), 5.0, 0.0));
        floor.insert_sorted(Reading::new(ReadingId::new(3), date(2024, 6, 2), 12.0, 0.0));
        let ids: Vec<u64> = floor.readings.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_consumption_in_month_includes_first_reading() {
        let mut floor = basement();
        // Give the first reading a non-zero value to show it is not skipped
        floor.readings[0].units_consumed = 7.0;
        let june = MonthKey::new(2024, 6).unwrap();
        let july = MonthKey::new(2024, 7).unwrap();
        assert_eq!(floor.consumption_in(june), 157.0);
        assert_eq!(floor.consumption_in(july), 260.0);
        // Overall totals still skip it
        assert_eq!(floor.total_consumption(), 562.0);
    }

    #[test]
    fn test_monotonic_over_many_insertions() {
        let mut floor = Floor::new(FloorId::new(4), "2nd Floor");
        let mut value = 92000.0;
        let mut day = date(2024, 1, 1);
        for i in 0..30 {
            floor
                .accept_reading(ReadingId::new(i), ReadingCandidate::new(day, value), today())
                .unwrap();
            value += 17.0 + i as f64;
            day = day.succ_opt().unwrap();
        }
        assert!(floor.history_is_consistent());
        assert_eq!(floor.total_consumption(), value - 17.0 - 29.0 - 92000.0);
    }
}
