//! Floor and reading service
//!
//! Every reading goes through the validator before anything is written.
//! With a remote list store configured the remote write happens first and
//! the local cache only changes once it has succeeded.

use chrono::NaiveDate;
use futures::future::join_all;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{MeterbookError, MeterbookResult};
use crate::models::reading::consumption_delta;
use crate::models::{
    BatchId, BulkEntry, BulkReadingForm, Floor, FloorId, Reading, ReadingCandidate, ReadingId,
    ReadingValidationError,
};
use crate::remote::ListStore;
use crate::storage::Storage;

use super::sync::SyncService;

/// Service for floors and their meter readings
pub struct ReadingService<'a> {
    storage: &'a Storage,
    remote: Option<&'a dyn ListStore>,
}

/// Result of a bulk submission
#[derive(Debug, Clone)]
pub struct BulkOutcome {
    /// Tag shared by the audit entries of this submission
    pub batch_id: BatchId,
    /// Readings that were stored, with their floor
    pub saved: Vec<(FloorId, Reading)>,
}

impl<'a> ReadingService<'a> {
    pub fn new(storage: &'a Storage, remote: Option<&'a dyn ListStore>) -> Self {
        Self { storage, remote }
    }

    /// All floors ordered by id
    pub fn list_floors(&self) -> MeterbookResult<Vec<Floor>> {
        self.storage.floors.get_all()
    }

    /// Find a floor by name (case-insensitive) or id
    pub fn find_floor(&self, identifier: &str) -> MeterbookResult<Option<Floor>> {
        if let Some(floor) = self.storage.floors.get_by_name(identifier)? {
            return Ok(Some(floor));
        }

        if let Ok(id) = identifier.parse::<FloorId>() {
            return self.storage.floors.get(id);
        }

        Ok(None)
    }

    /// Like `find_floor`, but a missing floor is an error
    pub fn get_floor(&self, identifier: &str) -> MeterbookResult<Floor> {
        self.find_floor(identifier)?
            .ok_or_else(|| MeterbookError::floor_not_found(identifier))
    }

    /// Create a floor in the local-only cache
    ///
    /// With a remote store the floors list is owned by the site.
    pub fn add_floor(&self, name: &str) -> MeterbookResult<Floor> {
        if self.remote.is_some() {
            return Err(MeterbookError::Config(
                "Floors are managed in the remote floors list while a remote is configured"
                    .into(),
            ));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(MeterbookError::MissingRequiredField("name"));
        }

        if self.storage.floors.name_exists(name)? {
            return Err(MeterbookError::Duplicate {
                entity_type: "Floor",
                identifier: name.to_string(),
            });
        }

        let floor = Floor::new(self.storage.floors.next_floor_id()?, name);
        self.storage.floors.upsert(floor.clone())?;
        self.storage.floors.save()?;

        self.storage.log_create(
            EntityType::Floor,
            floor.id.to_string(),
            Some(floor.name.clone()),
            &floor,
        )?;

        Ok(floor)
    }

    /// Validate and store one reading for a floor
    ///
    /// A rejected reading or a failed remote write leaves every store as it
    /// was.
    pub async fn add_reading(
        &self,
        floor_id: FloorId,
        candidate: ReadingCandidate,
        today: NaiveDate,
    ) -> MeterbookResult<Reading> {
        let mut floor = self
            .storage
            .floors
            .get(floor_id)?
            .ok_or_else(|| MeterbookError::floor_not_found(floor_id.to_string()))?;

        if let Err(err) = floor.check_reading(&candidate, today) {
            tracing::debug!(floor = %floor.name, error = %err, "Reading rejected");
            return Err(err.into());
        }

        let units = consumption_delta(floor.last_reading().map(|r| r.reading), candidate.value);
        let id = match self.remote {
            Some(remote) => remote.append_reading(floor_id, &candidate, units).await?,
            None => self.storage.floors.next_reading_id()?,
        };

        let reading = floor.accept_reading(id, candidate, today)?.clone();
        self.storage.floors.upsert(floor.clone())?;
        self.storage.floors.save()?;

        self.storage.log_create(
            EntityType::Reading,
            reading.id.to_string(),
            Some(floor.name.clone()),
            &reading,
        )?;

        tracing::info!(
            floor = %floor.name,
            reading = reading.reading,
            units = reading.units_consumed,
            "Reading recorded"
        );
        Ok(reading)
    }

    /// Submit a bulk form: one reading per entered floor, all on one date
    ///
    /// Remote writes run concurrently. Afterward the floors are always
    /// refetched so the cache shows exactly what the remote accepted, and any
    /// floors whose write failed are reported together in one error.
    pub async fn add_bulk(
        &self,
        form: &BulkReadingForm,
        today: NaiveDate,
    ) -> MeterbookResult<BulkOutcome> {
        let entries = form
            .submission()
            .map_err(|errors| self.name_floor_errors(errors))?;
        let batch_id = BatchId::new();

        if entries.is_empty() {
            return Ok(BulkOutcome {
                batch_id,
                saved: Vec::new(),
            });
        }

        let mut floors = Vec::with_capacity(entries.len());
        for entry in &entries {
            let floor = self
                .storage
                .floors
                .get(entry.floor_id)?
                .ok_or_else(|| MeterbookError::floor_not_found(entry.floor_id.to_string()))?;
            floor
                .check_reading(&entry.candidate, today)
                .map_err(|e| MeterbookError::BulkValidation(vec![(floor.name.clone(), e)]))?;
            floors.push(floor);
        }

        let outcome = match self.remote {
            Some(remote) => self.submit_remote(remote, floors, &entries, batch_id, today).await,
            None => self.submit_local(floors, &entries, batch_id, today),
        }?;

        Ok(outcome)
    }

    fn name_floor_errors(
        &self,
        errors: Vec<(FloorId, ReadingValidationError)>,
    ) -> MeterbookError {
        let named = errors
            .into_iter()
            .map(|(id, err)| {
                let name = self
                    .storage
                    .floors
                    .get(id)
                    .ok()
                    .flatten()
                    .map(|f| f.name)
                    .unwrap_or_else(|| id.to_string());
                (name, err)
            })
            .collect();
        MeterbookError::BulkValidation(named)
    }

    fn submit_local(
        &self,
        floors: Vec<Floor>,
        entries: &[BulkEntry],
        batch_id: BatchId,
        today: NaiveDate,
    ) -> MeterbookResult<BulkOutcome> {
        let mut next_id = self.storage.floors.next_reading_id()?;
        let mut saved = Vec::with_capacity(entries.len());
        let mut audit = Vec::with_capacity(entries.len());

        for (mut floor, entry) in floors.into_iter().zip(entries) {
            let reading = floor.accept_reading(next_id, entry.candidate, today)?.clone();
            next_id = ReadingId::new(next_id.get() + 1);

            audit.push(
                AuditEntry::create(
                    EntityType::Reading,
                    reading.id.to_string(),
                    Some(floor.name.clone()),
                    &reading,
                )
                .in_batch(batch_id),
            );
            saved.push((floor.id, reading));
            self.storage.floors.upsert(floor)?;
        }

        self.storage.floors.save()?;
        self.storage.log_batch(&audit)?;

        tracing::info!(%batch_id, saved = saved.len(), "Bulk readings recorded locally");
        Ok(BulkOutcome { batch_id, saved })
    }

    async fn submit_remote(
        &self,
        remote: &dyn ListStore,
        floors: Vec<Floor>,
        entries: &[BulkEntry],
        batch_id: BatchId,
        today: NaiveDate,
    ) -> MeterbookResult<BulkOutcome> {
        let writes = floors.iter().zip(entries).map(|(floor, entry)| {
            let units = consumption_delta(
                floor.last_reading().map(|r| r.reading),
                entry.candidate.value,
            );
            remote.append_reading(floor.id, &entry.candidate, units)
        });
        let results = join_all(writes).await;

        let mut saved = Vec::new();
        let mut failures = Vec::new();
        for ((mut floor, entry), result) in floors.into_iter().zip(entries).zip(results) {
            match result {
                Ok(id) => {
                    let reading = floor.accept_reading(id, entry.candidate, today)?.clone();
                    saved.push((floor, reading));
                }
                Err(err) => {
                    tracing::warn!(floor = %floor.name, error = %err, "Bulk reading write failed");
                    failures.push(format!("{}: {}", floor.name, err));
                }
            }
        }

        if let Err(err) = SyncService::new(self.storage, remote).refresh_floors().await {
            // Keep the cache in step with what the remote accepted
            tracing::warn!(error = %err, "Refresh after bulk submission failed");
            for (floor, _) in &saved {
                self.storage.floors.upsert(floor.clone())?;
            }
            self.storage.floors.save()?;
        }

        let audit: Vec<AuditEntry> = saved
            .iter()
            .map(|(floor, reading)| {
                AuditEntry::create(
                    EntityType::Reading,
                    reading.id.to_string(),
                    Some(floor.name.clone()),
                    reading,
                )
                .in_batch(batch_id)
            })
            .collect();
        self.storage.log_batch(&audit)?;

        tracing::info!(
            %batch_id,
            saved = saved.len(),
            failed = failures.len(),
            "Bulk readings submitted"
        );

        if !failures.is_empty() {
            return Err(MeterbookError::remote(
                "bulk add readings",
                format!(
                    "{} of {} floors failed ({})",
                    failures.len(),
                    entries.len(),
                    failures.join("; ")
                ),
            ));
        }

        Ok(BulkOutcome {
            batch_id,
            saved: saved
                .into_iter()
                .map(|(floor, reading)| (floor.id, reading))
                .collect(),
        })
    }
}
