//! Strongly-typed ID wrappers for all entity types
//!
//! Floors, readings and service requests are keyed by the numeric item id the
//! remote list store assigns. Newtypes keep them from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate list-item ID newtype wrappers
macro_rules! define_item_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw item id
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw item id
            pub const fn get(&self) -> u64 {
                self.0
            }

            /// The id following the largest of `existing` (1 when empty)
            pub fn next_after<I: IntoIterator<Item = Self>>(existing: I) -> Self {
                Self(existing.into_iter().map(|id| id.0).max().unwrap_or(0) + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_item_id!(FloorId, "floor-");
define_item_id!(ReadingId, "rdg-");
define_item_id!(RequestId, "req-");

/// Correlates the audit entries written by one bulk submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(Uuid);

impl BatchId {
    /// Create a new random batch ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch-{}", &self.0.to_string()[..8])
    }
}
