//! Bulk reading entry
//!
//! All floors in a batch share one reading date but keep their own history,
//! so every entered value is re-checked whenever the shared date changes.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::floor::Floor;
use super::ids::FloorId;
use super::reading::{ReadingCandidate, ReadingValidationError};
use crate::error::{MeterbookError, MeterbookResult};

/// A validated bulk entry ready to submit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulkEntry {
    pub floor_id: FloorId,
    pub candidate: ReadingCandidate,
}

/// Form state for entering readings for many floors at once
#[derive(Debug, Clone)]
pub struct BulkReadingForm {
    date: NaiveDate,
    today: NaiveDate,
    inputs: BTreeMap<FloorId, String>,
    errors: BTreeMap<FloorId, ReadingValidationError>,
}

impl BulkReadingForm {
    /// Start an empty form dated `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today,
            today,
            inputs: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Change the shared date and re-check every entered value
    pub fn set_date(&mut self, date: NaiveDate, floors: &[Floor]) {
        self.date = date;
        self.errors.clear();
        let entered: Vec<FloorId> = self.inputs.keys().copied().collect();
        for floor_id in entered {
            self.revalidate(floor_id, floors);
        }
    }

    /// Enter (or clear, with blank input) the value for one floor
    ///
    /// A floor missing from `floors` is refused and nothing is recorded.
    pub fn set_value(
        &mut self,
        floor_id: FloorId,
        input: &str,
        floors: &[Floor],
    ) -> MeterbookResult<()> {
        if input.trim().is_empty() {
            self.inputs.remove(&floor_id);
            self.errors.remove(&floor_id);
            return Ok(());
        }
        if !floors.iter().any(|f| f.id == floor_id) {
            return Err(MeterbookError::floor_not_found(floor_id.to_string()));
        }
        self.inputs.insert(floor_id, input.trim().to_string());
        self.revalidate(floor_id, floors);
        Ok(())
    }

    fn revalidate(&mut self, floor_id: FloorId, floors: &[Floor]) {
        let Some(input) = self.inputs.get(&floor_id) else {
            return;
        };
        let Some(floor) = floors.iter().find(|f| f.id == floor_id) else {
            tracing::warn!(%floor_id, "Bulk entry for a missing floor dropped");
            self.inputs.remove(&floor_id);
            self.errors.remove(&floor_id);
            return;
        };
        let result = ReadingCandidate::parse(self.date, input)
            .and_then(|candidate| floor.check_reading(&candidate, self.today));
        match result {
            Ok(()) => {
                self.errors.remove(&floor_id);
            }
            Err(err) => {
                self.errors.insert(floor_id, err);
            }
        }
    }

    /// Error for the shared date, if it lies in the future
    pub fn date_error(&self) -> Option<ReadingValidationError> {
        (self.date > self.today).then_some(ReadingValidationError::FutureDate {
            date: self.date,
            today: self.today,
        })
    }

    /// Per-floor errors for entered values
    pub fn errors(&self) -> &BTreeMap<FloorId, ReadingValidationError> {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        self.date_error().is_some() || !self.errors.is_empty()
    }

    /// Number of floors with a value entered
    pub fn entry_count(&self) -> usize {
        self.inputs.len()
    }

    /// Collect the validated entries, or every error found
    ///
    /// An empty form yields an empty submission.
    pub fn submission(&self) -> Result<Vec<BulkEntry>, Vec<(FloorId, ReadingValidationError)>> {
        if self.inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut errors: Vec<(FloorId, ReadingValidationError)> = Vec::new();
        if let Some(date_err) = self.date_error() {
            errors.extend(self.inputs.keys().map(|id| (*id, date_err.clone())));
        }
        errors.extend(self.errors.iter().map(|(id, e)| (*id, e.clone())));
        if !errors.is_empty() {
            errors.sort_by_key(|(id, _)| *id);
            errors.dedup_by_key(|(id, _)| *id);
            return Err(errors);
        }

        let mut entries = Vec::with_capacity(self.inputs.len());
        for (floor_id, input) in &self.inputs {
            let candidate = ReadingCandidate::parse(self.date, input)
                .map_err(|e| vec![(*floor_id, e)])?;
            entries.push(BulkEntry {
                floor_id: *floor_id,
                candidate,
            });
        }
        Ok(entries)
    }
}
