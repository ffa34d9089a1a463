//! Custom error types for Meterbook
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::ReadingValidationError;

/// The main error type for Meterbook operations
#[derive(Error, Debug)]
pub enum MeterbookError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic validation errors for form input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A meter reading was rejected by the validator
    #[error("Invalid reading: {0}")]
    Reading(#[from] ReadingValidationError),

    /// One or more floors in a bulk submission failed validation
    #[error("Bulk submission rejected: {}", format_floor_errors(.0))]
    BulkValidation(Vec<(String, ReadingValidationError)>),

    /// A paid bill or a paid service request lacks its payment details
    #[error("Missing payment information: {0}")]
    MissingPaymentInfo(String),

    /// A required form field was left blank
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A call to the remote list store failed
    #[error("Remote operation '{operation}' failed: {message}")]
    Remote { operation: String, message: String },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

fn format_floor_errors(errors: &[(String, ReadingValidationError)]) -> String {
    errors
        .iter()
        .map(|(floor, err)| format!("{}: {}", floor, err))
        .collect::<Vec<_>>()
        .join("; ")
}

impl MeterbookError {
    /// Create a "not found" error for floors
    pub fn floor_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Floor",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for bills
    pub fn bill_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Bill",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for service requests
    pub fn request_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Service request",
            identifier: identifier.into(),
        }
    }

    /// Wrap a remote failure with the name of the operation that failed
    pub fn remote(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Remote {
            operation: operation.into(),
            message: cause.to_string(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error came from form validation and should be shown inline
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Reading(_)
                | Self::BulkValidation(_)
                | Self::MissingPaymentInfo(_)
                | Self::MissingRequiredField(_)
        )
    }

    /// Check if this error came from the remote list store
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl From<std::io::Error> for MeterbookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MeterbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for MeterbookError {
    fn from(err: reqwest::Error) -> Self {
        let operation = err
            .url()
            .map(|u| u.path().to_string())
            .unwrap_or_else(|| "request".to_string());
        Self::Remote {
            operation,
            message: err.to_string(),
        }
    }
}

/// Result type alias for Meterbook operations
pub type MeterbookResult<T> = Result<T, MeterbookError>;
