// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ndis_market_domain::{Address, Coordinates};
use rust_decimal::Decimal;
use time::Date;

/// A GPS reading submitted with a check-in or check-out.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsReading {
    /// Where the provider is.
    pub location: Coordinates,
    /// Reported accuracy of the fix, in meters.
    pub accuracy_meters: Option<f64>,
    /// Optional photo evidence.
    pub photo_url: Option<String>,
}

/// A request to create a booking, validated at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub provider_id: i64,
    pub provider_service_id: i64,
    pub service_type: String,
    pub scheduled_date: Date,
    /// `HH:MM`
    pub scheduled_start_time: String,
    /// `HH:MM`
    pub scheduled_end_time: String,
    pub address: Address,
    pub service_location: Option<Coordinates>,
    pub notes: Option<String>,
}

/// A command against an existing booking, as data only.
///
/// Commands are the only way to request booking state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingCommand {
    /// Provider accepts a pending request.
    Accept,
    /// Provider declines a pending request.
    Decline {
        /// Optional reason shown to the participant.
        reason: Option<String>,
    },
    /// Provider arrives on site.
    CheckIn(GpsReading),
    /// Provider leaves the site.
    CheckOut(GpsReading),
    /// Provider confirms the service was delivered.
    ConfirmAsProvider,
    /// Participant confirms the service was delivered.
    ConfirmAsParticipant,
    /// Either party cancels.
    Cancel {
        /// Optional cancellation reason.
        reason: Option<String>,
    },
}

impl BookingCommand {
    /// Short operation name used in errors and logs.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline { .. } => "decline",
            Self::CheckIn(_) => "check in",
            Self::CheckOut(_) => "check out",
            Self::ConfirmAsProvider | Self::ConfirmAsParticipant => "confirm",
            Self::Cancel { .. } => "cancel",
        }
    }
}

/// A command against an existing invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceCommand {
    /// Issue a draft invoice.
    Send,
    /// Participant opened the invoice.
    MarkViewed,
    /// Provider records payment received outside the gateway.
    MarkPaid,
    /// Completed gateway payments now total `paid_total`.
    Settle {
        /// Sum of all completed payments on the invoice.
        paid_total: Decimal,
    },
    /// The due date passed without full payment.
    MarkOverdue {
        /// The date the sweep runs for.
        today: Date,
    },
    /// Provider withdraws the invoice.
    Cancel {
        /// Optional cancellation reason.
        reason: Option<String>,
    },
}

impl InvoiceCommand {
    /// Short operation name used in errors and logs.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::MarkViewed => "view",
            Self::MarkPaid => "mark as paid",
            Self::Settle { .. } => "settle",
            Self::MarkOverdue { .. } => "mark overdue",
            Self::Cancel { .. } => "cancel",
        }
    }
}
