//! Service request service
//!
//! Requests live only in the remote list. After every create or update the
//! list is fetched again so callers always see the remote's view.

use chrono::NaiveDate;

use crate::audit::EntityType;
use crate::error::{MeterbookError, MeterbookResult};
use crate::models::{
    Location, NewServiceRequest, RequestId, ServiceRequest, ServiceRequestUpdate,
};
use crate::remote::{ChoiceField, ListStore, ServiceRequestPatch};
use crate::storage::Storage;

/// Service for maintenance requests
pub struct ServiceRequestService<'a> {
    storage: &'a Storage,
    remote: Option<&'a dyn ListStore>,
}

impl<'a> ServiceRequestService<'a> {
    pub fn new(storage: &'a Storage, remote: Option<&'a dyn ListStore>) -> Self {
        Self { storage, remote }
    }

    fn store(&self) -> MeterbookResult<&'a dyn ListStore> {
        self.remote.ok_or_else(|| {
            MeterbookError::Config(
                "Service requests need a remote list store; run `meterbook config set-remote`"
                    .into(),
            )
        })
    }

    /// All requests, newest first
    pub async fn list(&self) -> MeterbookResult<Vec<ServiceRequest>> {
        let mut requests = self.store()?.fetch_service_requests().await?;
        requests.sort_by(|a, b| {
            b.request_date
                .cmp(&a.request_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(requests)
    }

    pub async fn get(&self, id: RequestId) -> MeterbookResult<ServiceRequest> {
        self.list()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| MeterbookError::request_not_found(id.to_string()))
    }

    /// Resolve a location typed as a floor name or id against the floors cache
    pub fn resolve_location(&self, input: &str) -> MeterbookResult<Location> {
        let input = input.trim();
        if input.is_empty() {
            return Err(MeterbookError::MissingRequiredField("location"));
        }
        let floor = match self.storage.floors.get_by_name(input)? {
            Some(floor) => Some(floor),
            None => match input.parse() {
                Ok(id) => self.storage.floors.get(id)?,
                Err(_) => None,
            },
        };
        floor
            .map(|floor| Location::new(Some(floor.id.get()), floor.name))
            .ok_or_else(|| MeterbookError::floor_not_found(input))
    }

    /// Raise a new request; it starts Open
    pub async fn raise(
        &self,
        form: NewServiceRequest,
        today: NaiveDate,
    ) -> MeterbookResult<ServiceRequest> {
        let store = self.store()?;
        let validated = form.validate(today)?;

        let id = store.append_service_request(&validated).await?;
        let created = self.get(id).await?;

        self.storage.log_create(
            EntityType::ServiceRequest,
            id.to_string(),
            Some(created.category.to_string()),
            &created,
        )?;

        tracing::info!(request = %id, category = %created.category, "Service request raised");
        Ok(created)
    }

    /// Apply an update form to a request
    pub async fn update(
        &self,
        id: RequestId,
        update: &ServiceRequestUpdate,
        today: NaiveDate,
    ) -> MeterbookResult<ServiceRequest> {
        let store = self.store()?;
        let before = self.get(id).await?;
        let after = update.apply(&before, today)?;

        store
            .update_service_request(id, &ServiceRequestPatch::from(&after))
            .await?;
        let refreshed = self.get(id).await?;

        self.storage.log_update(
            EntityType::ServiceRequest,
            id.to_string(),
            Some(refreshed.category.to_string()),
            &before,
            &refreshed,
        )?;

        tracing::info!(request = %id, status = %refreshed.status, "Service request updated");
        Ok(refreshed)
    }

    /// Allowed values of a choice column
    pub async fn choices(&self, field: ChoiceField) -> MeterbookResult<Vec<String>> {
        self.store()?.fetch_choices(field).await
    }
}
