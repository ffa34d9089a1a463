//! In-process list store
//!
//! Holds the three lists in memory and assigns item ids the way a list
//! server would. Appends can be made to fail per floor, or the whole store
//! taken offline, to exercise partial-failure handling.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::dto::{parse_remote_date, ServiceRequestPatch};
use super::{ChoiceField, ListStore};
use crate::error::{MeterbookError, MeterbookResult};
use crate::models::{
    Floor, FloorId, Location, Money, Reading, ReadingCandidate, ReadingId, RequestCategory,
    RequestId, RequestStatus, Resolution, ServicePayment, ServiceRequest, ValidatedRequest,
};

#[derive(Default)]
struct MemoryState {
    floors: Vec<Floor>,
    requests: Vec<ServiceRequest>,
    failing_floors: HashSet<FloorId>,
    unavailable: bool,
    reading_appends: usize,
}

#[derive(Default)]
pub struct MemoryListStore {
    state: Mutex<MemoryState>,
}

impl MemoryListStore {
    pub fn new(floors: Vec<Floor>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                floors,
                ..Default::default()
            }),
        }
    }

    pub fn with_requests(self, requests: Vec<ServiceRequest>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.requests = requests;
        }
        self
    }

    /// Make every reading append for `floor_id` fail
    pub fn fail_appends_for(&self, floor_id: FloorId) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_floors.insert(floor_id);
        }
    }

    /// Make every call fail, as if the site were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.unavailable = unavailable;
        }
    }

    /// Number of successful reading appends so far
    pub fn reading_appends(&self) -> usize {
        self.state.lock().map(|s| s.reading_appends).unwrap_or(0)
    }

    fn lock(&self, operation: &str) -> MeterbookResult<MutexGuard<'_, MemoryState>> {
        let state = self
            .state
            .lock()
            .map_err(|e| MeterbookError::remote(operation, format!("store poisoned: {}", e)))?;
        if state.unavailable {
            return Err(MeterbookError::remote(operation, "list store unavailable"));
        }
        Ok(state)
    }
}

fn next_reading_id(floors: &[Floor]) -> ReadingId {
    ReadingId::next_after(floors.iter().flat_map(|f| f.readings.iter().map(|r| r.id)))
}

/// Apply a patch the way the list server does: absent columns become empty
fn apply_patch(request: &mut ServiceRequest, patch: &ServiceRequestPatch) -> MeterbookResult<()> {
    let operation = "update service request";
    request.status = patch
        .status
        .parse::<RequestStatus>()
        .map_err(|e| MeterbookError::remote(operation, e))?;

    let resolution_date = patch.resolution_date.as_deref().and_then(parse_remote_date);
    request.resolution = match (request.status, resolution_date) {
        (RequestStatus::Resolved, Some(date)) => {
            let payment = match (
                patch.payment_amount,
                patch.payment_date.as_deref().and_then(parse_remote_date),
                patch.payment_mode.clone(),
            ) {
                (Some(amount), Some(date), Some(mode)) => Some(ServicePayment {
                    amount: Money::from_minor((amount * 100.0).round() as i64),
                    date,
                    mode,
                }),
                _ => None,
            };
            Some(Resolution {
                date,
                notes: patch.resolution_notes.clone(),
                payment,
            })
        }
        (RequestStatus::Resolved, None) => {
            return Err(MeterbookError::remote(operation, "resolutionDate is required"))
        }
        _ => None,
    };
    Ok(())
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn fetch_floors(&self) -> MeterbookResult<Vec<Floor>> {
        let state = self.lock("fetch floors")?;
        let mut floors = state.floors.clone();
        for floor in &mut floors {
            floor.normalize();
        }
        Ok(floors)
    }

    async fn append_reading(
        &self,
        floor_id: FloorId,
        candidate: &ReadingCandidate,
        units_consumed: f64,
    ) -> MeterbookResult<ReadingId> {
        let operation = "append reading";
        let mut state = self.lock(operation)?;
        if state.failing_floors.contains(&floor_id) {
            return Err(MeterbookError::remote(
                operation,
                format!("write rejected for {}", floor_id),
            ));
        }

        let id = next_reading_id(&state.floors);
        let floor = state
            .floors
            .iter_mut()
            .find(|f| f.id == floor_id)
            .ok_or_else(|| MeterbookError::remote(operation, format!("no such floor {}", floor_id)))?;
        floor.insert_sorted(Reading::new(id, candidate.date, candidate.value, units_consumed));
        state.reading_appends += 1;
        Ok(id)
    }

    async fn fetch_service_requests(&self) -> MeterbookResult<Vec<ServiceRequest>> {
        let state = self.lock("fetch service requests")?;
        Ok(state.requests.clone())
    }

    async fn append_service_request(
        &self,
        request: &ValidatedRequest,
    ) -> MeterbookResult<RequestId> {
        let mut state = self.lock("raise service request")?;
        let id = RequestId::next_after(state.requests.iter().map(|r| r.id));
        state.requests.push(ServiceRequest {
            id,
            request_date: request.request_date,
            category: request.category,
            location: Location::new(request.location.id, request.location.title.clone()),
            description: request.description.clone(),
            status: RequestStatus::Open,
            resolution: None,
        });
        Ok(id)
    }

    async fn update_service_request(
        &self,
        id: RequestId,
        patch: &ServiceRequestPatch,
    ) -> MeterbookResult<()> {
        let mut state = self.lock("update service request")?;
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| MeterbookError::request_not_found(id.to_string()))?;
        apply_patch(request, patch)
    }

    async fn fetch_choices(&self, field: ChoiceField) -> MeterbookResult<Vec<String>> {
        self.lock("fetch choices")?;
        Ok(match field {
            ChoiceField::Category => RequestCategory::all()
                .iter()
                .map(ToString::to_string)
                .collect(),
            ChoiceField::Status => RequestStatus::all()
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> MemoryListStore {
        MemoryListStore::new(vec![
            Floor::with_readings(
                FloorId::new(1),
                "Basement",
                vec![Reading::new(ReadingId::new(105), date(2024, 8, 5), 23562.0, 0.0)],
            ),
            Floor::new(FloorId::new(2), "Ground Floor"),
        ])
    }

    #[tokio::test]
    async fn test_append_assigns_next_id() {
        let store = store();
        let id = store
            .append_reading(
                FloorId::new(2),
                &ReadingCandidate::new(date(2024, 8, 20), 113600.0),
                0.0,
            )
            .await
            .unwrap();
        assert_eq!(id, ReadingId::new(106));
        assert_eq!(store.reading_appends(), 1);

        let floors = store.fetch_floors().await.unwrap();
        assert_eq!(floors[1].readings.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = store();
        store.fail_appends_for(FloorId::new(1));
        let result = store
            .append_reading(
                FloorId::new(1),
                &ReadingCandidate::new(date(2024, 8, 20), 23700.0),
                138.0,
            )
            .await;
        assert!(result.unwrap_err().is_remote());

        store.set_unavailable(true);
        assert!(store.fetch_floors().await.is_err());
        store.set_unavailable(false);
        assert!(store.fetch_floors().await.is_ok());
    }

    #[tokio::test]
    async fn test_request_lifecycle() {
        let store = MemoryListStore::default();
        let id = store
            .append_service_request(&ValidatedRequest {
                request_date: date(2024, 8, 20),
                category: RequestCategory::Plumbing,
                location: Location::new(Some(8), "Pump Room"),
                description: "Leak".into(),
            })
            .await
            .unwrap();
        assert_eq!(id, RequestId::new(1));

        let mut resolved = store.fetch_service_requests().await.unwrap()[0].clone();
        resolved.status = RequestStatus::Resolved;
        resolved.resolution = Some(Resolution {
            date: date(2024, 8, 22),
            notes: None,
            payment: Some(ServicePayment {
                amount: Money::from_minor(50000),
                date: date(2024, 8, 23),
                mode: "Cash".into(),
            }),
        });
        store
            .update_service_request(id, &ServiceRequestPatch::from(&resolved))
            .await
            .unwrap();

        let stored = store.fetch_service_requests().await.unwrap();
        assert_eq!(stored[0], resolved);
    }

    #[tokio::test]
    async fn test_choices_match_model() {
        let store = MemoryListStore::default();
        let statuses = store.fetch_choices(ChoiceField::Status).await.unwrap();
        assert_eq!(statuses, vec!["Open", "In Progress", "Resolved", "Cancelled"]);
    }
}
