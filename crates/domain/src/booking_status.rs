// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking status states and the transition table.
//!
//! Every permitted move is listed in `BookingStatus::TRANSITIONS`.
//! `Disputed` and `Invoiced` are declared for forward compatibility but no
//! entry in the table reaches them.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Waiting for the provider to respond.
    Pending,
    /// Provider accepted; service not yet started.
    Accepted,
    /// Provider declined.
    Declined,
    /// Provider has checked in.
    InProgress,
    /// Provider has checked out; awaiting both confirmations.
    PendingConfirmation,
    /// Both parties confirmed delivery.
    Completed,
    /// Cancelled by a party before completion.
    Cancelled,
    /// Reserved; no transition reaches this state.
    Disputed,
    /// Reserved; no transition reaches this state.
    Invoiced,
}

impl BookingStatus {
    /// The complete set of permitted `(from, to)` moves.
    pub const TRANSITIONS: &'static [(Self, Self)] = &[
        (Self::Pending, Self::Accepted),
        (Self::Pending, Self::Declined),
        (Self::Accepted, Self::InProgress),
        (Self::InProgress, Self::InProgress),
        (Self::InProgress, Self::PendingConfirmation),
        (Self::PendingConfirmation, Self::Completed),
        (Self::Pending, Self::Cancelled),
        (Self::Accepted, Self::Cancelled),
        (Self::InProgress, Self::Cancelled),
        (Self::PendingConfirmation, Self::Cancelled),
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::InProgress => "in_progress",
            Self::PendingConfirmation => "pending_confirmation",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Disputed => "disputed",
            Self::Invoiced => "invoiced",
        }
    }

    /// Returns true if no transition leaves this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !Self::TRANSITIONS.iter().any(|(from, _)| from == self)
    }

    /// Returns true if the booking may still be cancelled.
    #[must_use]
    pub fn is_cancellable(&self) -> bool {
        self.can_transition_to(Self::Cancelled)
    }

    /// Checks the transition table.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        Self::TRANSITIONS
            .iter()
            .any(|(from, to)| *from == *self && *to == target)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBookingTransition` if the move is not
    /// listed in the transition table.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidBookingTransition {
                from: *self,
                to: target,
            })
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "in_progress" => Ok(Self::InProgress),
            "pending_confirmation" => Ok(Self::PendingConfirmation),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "disputed" => Ok(Self::Disputed),
            "invoiced" => Ok(Self::Invoiced),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "booking status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
