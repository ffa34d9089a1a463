//! Consumption aggregation
//!
//! Pure projections over a floor collection. Nothing here is cached: callers
//! recompute after every change to the floors.

use std::collections::BTreeMap;

use crate::models::{Floor, MonthKey};

/// Units consumed in one calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    pub month: MonthKey,
    /// Chart label, e.g. "Jun 2024"
    pub label: String,
    pub units: f64,
}

/// One floor's share of the building total
#[derive(Debug, Clone, PartialEq)]
pub struct FloorShare {
    pub name: String,
    pub units: f64,
}

/// A month that has consumption data
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableMonth {
    pub key: MonthKey,
    /// Human label, e.g. "July 2024"
    pub label: String,
}

/// Total units consumed by a floor, excluding its first reading
pub fn floor_total(floor: &Floor) -> f64 {
    floor.total_consumption()
}

/// Sum of every floor's total
pub fn building_total(floors: &[Floor]) -> f64 {
    floors.iter().map(floor_total).sum()
}

fn accumulate(floor: &Floor, months: &mut BTreeMap<MonthKey, f64>) {
    for reading in floor.consuming_readings() {
        *months.entry(MonthKey::of(reading.date)).or_insert(0.0) += reading.units_consumed;
    }
}

fn into_series(months: BTreeMap<MonthKey, f64>) -> Vec<MonthlyPoint> {
    months
        .into_iter()
        .map(|(month, units)| MonthlyPoint {
            month,
            label: month.short_label(),
            units,
        })
        .collect()
}

/// Monthly consumption of one floor, oldest month first
pub fn monthly_series(floor: &Floor) -> Vec<MonthlyPoint> {
    let mut months = BTreeMap::new();
    accumulate(floor, &mut months);
    into_series(months)
}

/// Monthly consumption across the building, oldest month first
pub fn building_monthly_series(floors: &[Floor]) -> Vec<MonthlyPoint> {
    let mut months = BTreeMap::new();
    for floor in floors {
        accumulate(floor, &mut months);
    }
    into_series(months)
}

/// Per-floor totals, skipping floors that consumed nothing
pub fn breakdown_by_floor(floors: &[Floor]) -> Vec<FloorShare> {
    floors
        .iter()
        .map(|floor| FloorShare {
            name: floor.name.clone(),
            units: floor_total(floor),
        })
        .filter(|share| share.units > 0.0)
        .collect()
}

/// Months with consumption data, most recent first
pub fn available_months(floors: &[Floor]) -> Vec<AvailableMonth> {
    let mut months: Vec<MonthKey> = floors
        .iter()
        .flat_map(|floor| floor.consuming_readings().map(|r| MonthKey::of(r.date)))
        .collect();
    months.sort_unstable_by(|a, b| b.cmp(a));
    months.dedup();
    months
        .into_iter()
        .map(|key| AvailableMonth {
            key,
            label: key.long_label(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FloorId, Reading, ReadingId};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn floor(id: u64, name: &str, points: &[(NaiveDate, f64)]) -> Floor {
        let readings = points
            .iter()
            .enumerate()
            .map(|(i, (d, v))| Reading::new(ReadingId::new(id * 100 + i as u64), *d, *v, 0.0))
            .collect();
        Floor::with_readings(FloorId::new(id), name, readings)
    }

    fn building() -> Vec<Floor> {
        vec![
            floor(
                1,
                "Basement",
                &[
                    (date(2024, 6, 15), 23000.0),
                    (date(2024, 6, 28), 23150.0),
                    (date(2024, 7, 10), 23280.0),
                ],
            ),
            floor(
                7,
                "Lift",
                &[(date(2024, 7, 1), 150000.0), (date(2024, 8, 11), 150592.0)],
            ),
            floor(9, "Charging Station", &[(date(2024, 8, 1), 4000.0)]),
        ]
    }

    #[test]
    fn test_monthly_series_skips_first_reading() {
        let floors = building();
        let series = monthly_series(&floors[0]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Jun 2024");
        assert_eq!(series[0].units, 150.0);
        assert_eq!(series[1].label, "Jul 2024");
        assert_eq!(series[1].units, 130.0);
    }

    #[test]
    fn test_building_total_is_sum_of_floors() {
        let floors = building();
        let per_floor: f64 = floors.iter().map(floor_total).sum();
        assert_eq!(building_total(&floors), per_floor);
        assert_eq!(building_total(&floors), 872.0);
    }

    #[test]
    fn test_building_series_merges_floors() {
        let series = building_monthly_series(&building());
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Jun 2024", "Jul 2024", "Aug 2024"]);
        assert_eq!(series[2].units, 592.0);
    }

    #[test]
    fn test_breakdown_excludes_idle_floors() {
        let breakdown = breakdown_by_floor(&building());
        let names: Vec<&str> = breakdown.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Basement", "Lift"]);
    }

    #[test]
    fn test_available_months_descending() {
        let months = available_months(&building());
        let keys: Vec<String> = months.iter().map(|m| m.key.to_string()).collect();
        assert_eq!(keys, vec!["2024-08", "2024-07", "2024-06"]);
        assert_eq!(months[0].label, "August 2024");
    }

    #[test]
    fn test_empty_building() {
        assert_eq!(building_total(&[]), 0.0);
        assert!(building_monthly_series(&[]).is_empty());
        assert!(available_months(&[]).is_empty());
    }
}
