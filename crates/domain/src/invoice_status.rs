// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice, payment, and payout status states.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Created but not yet issued.
    #[default]
    Draft,
    /// Issued to the bill-to party.
    Sent,
    /// Opened by the participant.
    Viewed,
    /// Settled in full.
    Paid,
    /// Some payment received.
    PartiallyPaid,
    /// Past its due date without full payment.
    Overdue,
    /// Withdrawn by the provider.
    Cancelled,
}

impl InvoiceStatus {
    /// The complete set of permitted `(from, to)` moves.
    pub const TRANSITIONS: &'static [(Self, Self)] = &[
        (Self::Draft, Self::Sent),
        (Self::Sent, Self::Viewed),
        (Self::Sent, Self::Paid),
        (Self::Viewed, Self::Paid),
        (Self::PartiallyPaid, Self::Paid),
        (Self::Overdue, Self::Paid),
        (Self::Sent, Self::PartiallyPaid),
        (Self::Viewed, Self::PartiallyPaid),
        (Self::Overdue, Self::PartiallyPaid),
        (Self::Sent, Self::Overdue),
        (Self::Viewed, Self::Overdue),
        (Self::PartiallyPaid, Self::Overdue),
        (Self::Draft, Self::Cancelled),
        (Self::Sent, Self::Cancelled),
        (Self::Viewed, Self::Cancelled),
        (Self::PartiallyPaid, Self::Cancelled),
        (Self::Overdue, Self::Cancelled),
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Paid => "paid",
            Self::PartiallyPaid => "partially_paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Checks the transition table.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        Self::TRANSITIONS
            .iter()
            .any(|(from, to)| *from == *self && *to == target)
    }

    /// Returns true if the invoice is issued and still awaiting money.
    #[must_use]
    pub const fn is_payable(&self) -> bool {
        matches!(
            self,
            Self::Sent | Self::Viewed | Self::PartiallyPaid | Self::Overdue
        )
    }
}

impl FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "viewed" => Ok(Self::Viewed),
            "paid" => Ok(Self::Paid),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "invoice status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a payment against an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Intent created, not yet confirmed.
    #[default]
    Pending,
    /// Funds captured.
    Completed,
    /// Fully refunded.
    Refunded,
    /// Some funds refunded.
    PartiallyRefunded,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
        }
    }

    /// Returns true if captured funds remain that could be refunded.
    #[must_use]
    pub const fn is_refundable(&self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyRefunded)
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "refunded" => Ok(Self::Refunded),
            "partially_refunded" => Ok(Self::PartiallyRefunded),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "payment status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether an invoice's provider share has been batched for payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Not yet included in a payout.
    #[default]
    Pending,
    /// Included in a payout batch.
    Processing,
}

impl PayoutStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
        }
    }
}

impl FromStr for PayoutStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "payout status",
                value: s.to_string(),
            }),
        }
    }
}
