//! Display formatting for terminal output
//!
//! Tables and detail views for floors, bills and service requests.

pub mod bill;
pub mod floor;
pub mod report;
pub mod request;

pub use bill::{format_bill_details, format_bill_list};
pub use floor::{format_floor_details, format_floor_list};
pub use request::{format_request_details, format_request_list};
