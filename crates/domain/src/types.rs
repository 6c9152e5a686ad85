// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The role a marketplace user acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A person receiving NDIS supports.
    Participant,
    /// A business delivering supports.
    Provider,
    /// A support coordinator acting for participants.
    Coordinator,
    /// Platform staff.
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Provider => "provider",
            Self::Coordinator => "coordinator",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "participant" => Ok(Self::Participant),
            "provider" => Ok(Self::Provider),
            "coordinator" => Ok(Self::Coordinator),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account status of a marketplace user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// The account may transact.
    #[default]
    Active,
    /// The account awaits verification.
    Pending,
    /// The account has been suspended by an admin.
    Suspended,
}

impl UserStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Suspended => "suspended",
        }
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "suspended" => Ok(Self::Suspended),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "user status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who an invoice is billed to, following the participant's plan management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BillToType {
    /// The participant pays directly.
    #[default]
    SelfManaged,
    /// A plan manager pays on the participant's behalf.
    PlanManaged,
    /// The NDIA pays.
    NdiaManaged,
}

impl BillToType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SelfManaged => "self_managed",
            Self::PlanManaged => "plan_managed",
            Self::NdiaManaged => "ndia_managed",
        }
    }
}

impl FromStr for BillToType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self_managed" => Ok(Self::SelfManaged),
            "plan_managed" => Ok(Self::PlanManaged),
            "ndia_managed" => Ok(Self::NdiaManaged),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "bill-to type",
                value: s.to_string(),
            }),
        }
    }
}

/// How a provider service is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// Charged per hour of service.
    #[default]
    Hourly,
    /// Charged once per booking.
    Fixed,
}

impl RateType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Fixed => "fixed",
        }
    }
}

impl FromStr for RateType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Self::Hourly),
            "fixed" => Ok(Self::Fixed),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "rate type",
                value: s.to_string(),
            }),
        }
    }
}

/// Kind of GPS event recorded against a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    /// Provider arrives on site.
    CheckIn,
    /// Provider leaves the site.
    CheckOut,
}

impl CheckType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CheckIn => "check_in",
            Self::CheckOut => "check_out",
        }
    }
}

impl FromStr for CheckType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check_in" => Ok(Self::CheckIn),
            "check_out" => Ok(Self::CheckOut),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "check type",
                value: s.to_string(),
            }),
        }
    }
}

/// A validated WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Creates a position, rejecting out-of-range or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if latitude is outside
    /// `[-90, 90]` or longitude is outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        let valid: bool = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(DomainError::InvalidCoordinates {
                latitude: latitude.to_string(),
                longitude: longitude.to_string(),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A postal service address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub suburb: String,
    pub state: String,
    pub postcode: String,
}
