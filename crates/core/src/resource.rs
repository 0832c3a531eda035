//! Resource kinds and the informational resource status.
//!
//! Cars, motorcycles, houses and excursions share one booking engine; the
//! kind only decides path segments and how the unit count is interpreted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Upper bound on excursion participants per reservation.
pub const MAX_PARTICIPANTS: i32 = 100;

// ---------------------------------------------------------------------------
// Resource kind
// ---------------------------------------------------------------------------

/// The category of rentable entity. Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Car,
    Motorcycle,
    House,
    Excursion,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Car,
        ResourceKind::Motorcycle,
        ResourceKind::House,
        ResourceKind::Excursion,
    ];

    /// Database and singular path value (`car`, `house`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
            Self::House => "house",
            Self::Excursion => "excursion",
        }
    }

    /// Plural path segment (`cars`, `houses`, ...).
    pub fn plural(self) -> &'static str {
        match self {
            Self::Car => "cars",
            Self::Motorcycle => "motorcycles",
            Self::House => "houses",
            Self::Excursion => "excursions",
        }
    }

    /// Entity label used in not-found errors.
    pub fn entity_name(self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Motorcycle => "Motorcycle",
            Self::House => "House",
            Self::Excursion => "Excursion",
        }
    }

    /// Resolve the unit count for a booking of this kind.
    ///
    /// Excursions are priced per participant; every other kind is priced
    /// per resource, so an explicit count other than 1 is rejected.
    pub fn unit_count(self, requested: Option<i32>) -> Result<i32, CoreError> {
        match (self, requested) {
            (Self::Excursion, None) => Ok(1),
            (Self::Excursion, Some(n)) if (1..=MAX_PARTICIPANTS).contains(&n) => Ok(n),
            (Self::Excursion, Some(n)) => Err(CoreError::Validation(format!(
                "participants must be between 1 and {MAX_PARTICIPANTS}, got {n}"
            ))),
            (_, None) | (_, Some(1)) => Ok(1),
            (kind, Some(_)) => Err(CoreError::Validation(format!(
                "participants can only be set for excursions, not {}",
                kind.plural()
            ))),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.plural() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown resource kind: '{s}'")))
    }
}

impl TryFrom<String> for ResourceKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Resource status
// ---------------------------------------------------------------------------

/// Informational availability flag on a resource.
///
/// Discriminants match the `resource_statuses` seed rows. The booking
/// engine never reads this; the HTTP layer folds it into availability
/// answers.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Available = 1,
    Booked = 2,
}

impl ResourceStatus {
    /// Return the database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
        }
    }
}

impl TryFrom<i16> for ResourceStatus {
    type Error = CoreError;

    fn try_from(id: i16) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::Available),
            2 => Ok(Self::Booked),
            other => Err(CoreError::Internal(format!(
                "Unknown resource status id: {other}"
            ))),
        }
    }
}

impl FromStr for ResourceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "booked" => Ok(Self::Booked),
            other => Err(CoreError::Validation(format!(
                "Unknown resource status: '{other}'"
            ))),
        }
    }
}
