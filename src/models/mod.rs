//! Core data models for Meterbook
//!
//! This module contains the data structures of the building-utility domain:
//! floors and their meter readings, monthly bills and maintenance requests.

pub mod bill;
pub mod bulk;
pub mod floor;
pub mod ids;
pub mod money;
pub mod month;
pub mod reading;
pub mod service_request;

pub use bill::{Attachment, Bill, BillStatus, BillUpload};
pub use bulk::{BulkEntry, BulkReadingForm};
pub use floor::Floor;
pub use ids::{BatchId, FloorId, ReadingId, RequestId};
pub use money::Money;
pub use month::MonthKey;
pub use reading::{
    format_units, parse_reading_value, Reading, ReadingCandidate, ReadingValidationError,
};
pub use service_request::{
    Location, NewServiceRequest, RequestCategory, RequestStatus, Resolution, ServicePayment,
    ServiceRequest, ServiceRequestUpdate, ValidatedRequest,
};
