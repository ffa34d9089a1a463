//! Remote list store
//!
//! The building's shared data lives in three remote lists: floors, readings
//! and service requests. `ListStore` exposes exactly the operations the
//! services consume; `HttpListStore` talks to a real site and
//! `MemoryListStore` keeps everything in process.

pub mod dto;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use std::fmt;

use crate::error::MeterbookResult;
use crate::models::{
    Floor, FloorId, ReadingCandidate, ReadingId, RequestId, ServiceRequest, ValidatedRequest,
};

pub use dto::ServiceRequestPatch;
pub use http::HttpListStore;
pub use memory::MemoryListStore;

/// Choice columns of the service requests list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceField {
    Category,
    Status,
}

impl ChoiceField {
    /// Internal column name
    pub fn internal_name(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for ChoiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.internal_name())
    }
}

#[async_trait]
pub trait ListStore: Send + Sync {
    /// All floors with their readings joined and normalized
    async fn fetch_floors(&self) -> MeterbookResult<Vec<Floor>>;

    /// Append one reading and return the id the list assigned
    async fn append_reading(
        &self,
        floor_id: FloorId,
        candidate: &ReadingCandidate,
        units_consumed: f64,
    ) -> MeterbookResult<ReadingId>;

    async fn fetch_service_requests(&self) -> MeterbookResult<Vec<ServiceRequest>>;

    /// Create a request (always Open) and return its id
    async fn append_service_request(&self, request: &ValidatedRequest)
        -> MeterbookResult<RequestId>;

    async fn update_service_request(
        &self,
        id: RequestId,
        patch: &ServiceRequestPatch,
    ) -> MeterbookResult<()>;

    /// Allowed values of a choice column
    async fn fetch_choices(&self, field: ChoiceField) -> MeterbookResult<Vec<String>>;
}
