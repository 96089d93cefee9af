//! Package records.
//!
//! A package carries its tracking code plus a few optional descriptive
//! fields. The allocator only ever looks at the tracking code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::code::{parse_tracking_code, CodeError, TrackingCode};

/// Counts of the containers making up a consignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Quantities {
    /// Number of boxes.
    pub boxes: u32,
    /// Number of basins.
    pub basins: u32,
    /// Number of small sacks.
    pub small_sacks: u32,
}

impl Quantities {
    /// Create a quantity record.
    #[must_use]
    pub fn new(boxes: u32, basins: u32, small_sacks: u32) -> Self {
        Self {
            boxes,
            basins,
            small_sacks,
        }
    }

    /// Total number of items across all container kinds.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.boxes) + u64::from(self.basins) + u64::from(self.small_sacks)
    }

    /// Whether no item is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl std::ops::AddAssign for Quantities {
    fn add_assign(&mut self, rhs: Self) {
        self.boxes = self.boxes.saturating_add(rhs.boxes);
        self.basins = self.basins.saturating_add(rhs.basins);
        self.small_sacks = self.small_sacks.saturating_add(rhs.small_sacks);
    }
}

/// Contact and routing details of a package. Blank values become `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDetails {
    /// Name of the sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// Name of the receiver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,
    /// Receiver's phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_phone: Option<String>,
    /// Destination the package is travelling to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl PackageDetails {
    /// Collapse empty or whitespace-only fields to `None` and trim the rest.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            sender_name: non_blank(self.sender_name),
            receiver_name: non_blank(self.receiver_name),
            receiver_phone: non_blank(self.receiver_phone),
            destination: non_blank(self.destination),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// A package about to be appended to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPackage {
    /// The allocated tracking code.
    pub code: TrackingCode,
    /// Container counts.
    pub quantities: Quantities,
    /// Contact and routing details.
    pub details: PackageDetails,
}

impl NewPackage {
    /// Build a new package record, normalizing its details.
    #[must_use]
    pub fn new(code: TrackingCode, quantities: Quantities, details: PackageDetails) -> Self {
        Self {
            code,
            quantities,
            details: details.normalized(),
        }
    }
}

/// A stored package.
///
/// `tracking_code` is kept as the raw stored string: rows written by older
/// tools may not parse, and those must still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Identifier assigned by the store.
    pub id: i64,
    /// Tracking code as stored.
    pub tracking_code: String,
    /// Name of the station the package was registered at.
    pub station: String,
    /// Container counts.
    pub quantities: Quantities,
    /// Contact and routing details.
    #[serde(flatten)]
    pub details: PackageDetails,
    /// When the package was registered.
    pub created_at: DateTime<Utc>,
}

impl Package {
    /// Parse the stored tracking code.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::Malformed`] if the stored code does not parse.
    pub fn code(&self) -> Result<TrackingCode, CodeError> {
        parse_tracking_code(&self.tracking_code)
    }
}
