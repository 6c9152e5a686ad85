// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;

use crate::booking_status::BookingStatus;
use crate::invoice_status::{InvoiceStatus, PaymentStatus};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A time of day was not in `HH:MM` form.
    InvalidTimeOfDay {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The scheduled end is not after the scheduled start.
    NonPositiveDuration {
        /// The scheduled start time (`HH:MM`).
        start: String,
        /// The scheduled end time (`HH:MM`).
        end: String,
    },
    /// Latitude or longitude out of range.
    InvalidCoordinates {
        /// The rejected latitude.
        latitude: String,
        /// The rejected longitude.
        longitude: String,
    },
    /// An enumerated value could not be parsed.
    InvalidEnumValue {
        /// The kind of value (e.g. `role`, `booking status`).
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
    /// An operation is not permitted in the booking's current status.
    InvalidBookingState {
        /// The attempted operation.
        operation: &'static str,
        /// The booking's current status.
        status: BookingStatus,
    },
    /// A booking status transition is not in the transition table.
    InvalidBookingTransition {
        /// The current status.
        from: BookingStatus,
        /// The requested status.
        to: BookingStatus,
    },
    /// An operation is not permitted in the invoice's current status.
    InvalidInvoiceState {
        /// The attempted operation.
        operation: &'static str,
        /// The invoice's current status.
        status: InvoiceStatus,
    },
    /// An operation is not permitted in the payment's current status.
    InvalidPaymentState {
        /// The attempted operation.
        operation: &'static str,
        /// The payment's current status.
        status: PaymentStatus,
    },
    /// An invoice must carry at least one line item.
    EmptyInvoice,
    /// A line item quantity must be strictly positive.
    InvalidQuantity {
        /// The line number (1-based).
        line_number: u32,
        /// The rejected quantity.
        quantity: Decimal,
    },
    /// A money amount must not be negative.
    NegativeAmount {
        /// The field carrying the amount.
        field: &'static str,
        /// The rejected amount.
        amount: Decimal,
    },
    /// A money value could not be parsed.
    InvalidMoney {
        /// The rejected text.
        value: String,
    },
    /// A booking already has an invoice line item.
    BookingAlreadyInvoiced {
        /// The booking identifier.
        booking_id: i64,
    },
    /// A refund exceeds what is left to refund, or is not positive.
    InvalidRefundAmount {
        /// The requested refund.
        requested: Decimal,
        /// The amount still refundable.
        refundable: Decimal,
    },
    /// No invoice qualified for a payout batch.
    EmptyPayoutBatch {
        /// The provider identifier.
        provider_id: i64,
    },
    /// A free-form field failed validation.
    InvalidField {
        /// The field name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// Date or time arithmetic overflowed.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeOfDay { value, reason } => {
                write!(f, "Invalid time of day '{value}': {reason}")
            }
            Self::NonPositiveDuration { start, end } => {
                write!(
                    f,
                    "Scheduled end time {end} must be after scheduled start time {start}"
                )
            }
            Self::InvalidCoordinates {
                latitude,
                longitude,
            } => {
                write!(f, "Invalid coordinates ({latitude}, {longitude})")
            }
            Self::InvalidEnumValue { kind, value } => {
                write!(f, "Invalid {kind}: '{value}'")
            }
            Self::InvalidBookingState { operation, status } => {
                write!(f, "Cannot {operation} a booking with status '{status}'")
            }
            Self::InvalidBookingTransition { from, to } => {
                write!(f, "Booking cannot move from '{from}' to '{to}'")
            }
            Self::InvalidInvoiceState { operation, status } => {
                write!(f, "Cannot {operation} an invoice with status '{status}'")
            }
            Self::InvalidPaymentState { operation, status } => {
                write!(f, "Cannot {operation} a payment with status '{status}'")
            }
            Self::EmptyInvoice => write!(f, "An invoice requires at least one line item"),
            Self::InvalidQuantity {
                line_number,
                quantity,
            } => {
                write!(
                    f,
                    "Line {line_number}: quantity {quantity} must be greater than zero"
                )
            }
            Self::NegativeAmount { field, amount } => {
                write!(f, "{field} must not be negative (got {amount})")
            }
            Self::InvalidMoney { value } => write!(f, "Invalid money amount '{value}'"),
            Self::BookingAlreadyInvoiced { booking_id } => {
                write!(f, "Booking {booking_id} has already been invoiced")
            }
            Self::InvalidRefundAmount {
                requested,
                refundable,
            } => {
                write!(
                    f,
                    "Refund of {requested} is invalid: {refundable} is refundable"
                )
            }
            Self::EmptyPayoutBatch { provider_id } => {
                write!(
                    f,
                    "Provider {provider_id} has no paid invoices awaiting payout"
                )
            }
            Self::InvalidField { field, reason } => write!(f, "Invalid {field}: {reason}"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
