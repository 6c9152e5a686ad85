// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ndis_market_audit::StatusChange;
use ndis_market_domain::{
    Booking, BookingStatus, CheckInRecord, Invoice, InvoiceStatus, NewBooking, NewInvoice,
};

/// A booking ready to insert, with its creation history record.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    /// The priced and numbered booking.
    pub booking: NewBooking,
    /// The `null -> pending` history record.
    pub status_change: StatusChange<BookingStatus>,
}

/// The result of a successful booking command.
///
/// Transitions are atomic: they either succeed completely or fail without
/// side effects. When `changed` is false the command was an idempotent
/// repeat and nothing needs to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingTransition {
    /// The booking after the command.
    pub booking: Booking,
    /// Whether any field changed.
    pub changed: bool,
    /// The history record, if the status moved.
    pub status_change: Option<StatusChange<BookingStatus>>,
    /// The GPS record, for check-in and check-out.
    pub check_in: Option<CheckInRecord>,
}

impl BookingTransition {
    /// Returns true if this transition completed the booking.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.status_change
            .as_ref()
            .is_some_and(|c| c.to == BookingStatus::Completed)
    }
}

/// An invoice ready to insert, with its creation history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    /// The priced invoice and its lines.
    pub invoice: NewInvoice,
    /// The `null -> draft` history record.
    pub status_change: StatusChange<InvoiceStatus>,
}

/// The result of a successful invoice command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTransition {
    /// The invoice after the command.
    pub invoice: Invoice,
    /// Whether any field changed.
    pub changed: bool,
    /// The history record, if the status moved.
    pub status_change: Option<StatusChange<InvoiceStatus>>,
}
