//! Service layer for Meterbook
//!
//! Business operations on top of the local store and the remote list store:
//! validation, ordering of remote and local writes, and audit logging.

pub mod bill;
pub mod reading;
pub mod service_request;
pub mod sync;

pub use bill::BillService;
pub use reading::{BulkOutcome, ReadingService};
pub use service_request::ServiceRequestService;
pub use sync::SyncService;
