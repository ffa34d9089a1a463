//! Maintenance service request model
//!
//! Requests start Open and move between Open, In Progress, Resolved and
//! Cancelled. Resolution and payment details exist only while a request is
//! Resolved, which the `resolution` field encodes directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::bill::require_payment;
use super::ids::RequestId;
use super::money::Money;
use crate::error::{MeterbookError, MeterbookResult};

/// Kind of maintenance issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestCategory {
    Electrical,
    Lift,
    #[serde(rename = "Fire System")]
    FireSystem,
    Plumbing,
    #[serde(rename = "General Maintenance")]
    GeneralMaintenance,
}

impl RequestCategory {
    pub fn all() -> &'static [RequestCategory] {
        &[
            Self::Electrical,
            Self::Lift,
            Self::FireSystem,
            Self::Plumbing,
            Self::GeneralMaintenance,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electrical => "Electrical",
            Self::Lift => "Lift",
            Self::FireSystem => "Fire System",
            Self::Plumbing => "Plumbing",
            Self::GeneralMaintenance => "General Maintenance",
        }
    }
}

impl fmt::Display for RequestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestCategory {
    type Err = MeterbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_choice(s);
        Self::all()
            .iter()
            .copied()
            .find(|c| normalize_choice(c.as_str()) == wanted)
            .ok_or_else(|| {
                MeterbookError::Validation(format!("Unknown request category '{}'", s.trim()))
            })
    }
}

/// Lifecycle state of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RequestStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Cancelled,
}

impl RequestStatus {
    pub fn all() -> &'static [RequestStatus] {
        &[Self::Open, Self::InProgress, Self::Resolved, Self::Cancelled]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Resolved and Cancelled close a request
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = MeterbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_choice(s);
        Self::all()
            .iter()
            .copied()
            .find(|st| normalize_choice(st.as_str()) == wanted)
            .ok_or_else(|| {
                MeterbookError::Validation(format!("Unknown request status '{}'", s.trim()))
            })
    }
}

/// Lowercase and drop separators so "in-progress", "In Progress" and
/// "in_progress" all match
fn normalize_choice(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Where the issue is, as a reference into the floors list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Item id of the floor in the remote floors list, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
}

impl Location {
    pub fn new(id: Option<u64>, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Payment made to settle a resolved request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePayment {
    pub amount: Money,
    pub date: NaiveDate,
    pub mode: String,
}

/// Resolution details of a resolved request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<ServicePayment>,
}

/// A maintenance ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: RequestId,
    pub request_date: NaiveDate,
    pub category: RequestCategory,
    pub location: Location,
    pub description: String,
    pub status: RequestStatus,
    /// Present iff `status` is Resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl ServiceRequest {
    /// Amount paid for this request, zero when unpaid
    pub fn payment_amount(&self) -> Money {
        self.resolution
            .as_ref()
            .and_then(|r| r.payment.as_ref())
            .map(|p| p.amount)
            .unwrap_or_default()
    }

    /// Check the status/resolution invariant
    pub fn is_consistent(&self) -> bool {
        (self.status == RequestStatus::Resolved) == self.resolution.is_some()
    }
}

/// Input of the "raise request" form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceRequest {
    /// Defaults to today when absent
    pub request_date: Option<NaiveDate>,
    pub category: RequestCategory,
    pub location: Location,
    pub description: String,
}

/// A validated new request, ready to be sent to the list store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub request_date: NaiveDate,
    pub category: RequestCategory,
    pub location: Location,
    pub description: String,
}

impl NewServiceRequest {
    /// Check the form; new requests start Open
    ///
    /// The location must be a floor from the floors list.
    pub fn validate(self, today: NaiveDate) -> MeterbookResult<ValidatedRequest> {
        if self.location.title.trim().is_empty() || self.location.id.is_none() {
            return Err(MeterbookError::MissingRequiredField("location"));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(MeterbookError::MissingRequiredField("description"));
        }
        let request_date = self.request_date.unwrap_or(today);
        if request_date > today {
            return Err(MeterbookError::Validation(
                "Request date cannot be in the future.".into(),
            ));
        }
        Ok(ValidatedRequest {
            request_date,
            category: self.category,
            location: Location::new(self.location.id, self.location.title.trim()),
            description: description.to_string(),
        })
    }
}

/// Input of the "update request" form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRequestUpdate {
    pub status: RequestStatus,
    pub resolution_date: Option<NaiveDate>,
    pub resolution_notes: Option<String>,
    /// Raw amount as typed; blank or absent means no payment
    pub payment_amount: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub payment_mode: Option<String>,
}

impl ServiceRequestUpdate {
    /// Produce the updated request, or the first form error
    ///
    /// Leaving Resolved (or never entering it) clears every resolution and
    /// payment field.
    pub fn apply(
        &self,
        request: &ServiceRequest,
        today: NaiveDate,
    ) -> MeterbookResult<ServiceRequest> {
        let mut updated = request.clone();
        updated.status = self.status;

        if self.status != RequestStatus::Resolved {
            updated.resolution = None;
            return Ok(updated);
        }

        let date = self
            .resolution_date
            .ok_or(MeterbookError::MissingRequiredField("resolution date"))?;
        if date > today {
            return Err(MeterbookError::Validation(
                "Resolution date cannot be in the future.".into(),
            ));
        }

        let amount_input = self
            .payment_amount
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let payment = match amount_input {
            Some(raw) => {
                let amount = Money::parse(raw)
                    .ok()
                    .filter(|m| !m.is_negative())
                    .ok_or_else(|| {
                        MeterbookError::Validation("Please enter a valid payment amount.".into())
                    })?;
                let (date, mode) = require_payment(
                    self.payment_date,
                    self.payment_mode.as_deref(),
                    "paid requests",
                )?;
                Some(ServicePayment { amount, date, mode })
            }
            None => None,
        };

        let notes = self
            .resolution_notes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        updated.resolution = Some(Resolution {
            date,
            notes,
            payment,
        });
        Ok(updated)
    }
}
