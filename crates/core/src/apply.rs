// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{BookingCommand, GpsReading, InvoiceCommand};
use crate::error::CoreError;
use crate::state::{BookingTransition, InvoiceTransition};
use ndis_market_audit::{Actor, StatusChange};
use ndis_market_domain::{
    Booking, BookingStatus, CheckInRecord, CheckType, DomainError, GeofenceCheck, Invoice,
    InvoiceStatus, PlatformSettings, elapsed_hours, evaluate_geofence, settlement_status,
};
use time::OffsetDateTime;

/// Applies a command to a booking, producing the updated booking and the
/// records to persist with it.
///
/// This function checks lifecycle rules only. Whether the actor owns the
/// side of the booking they act for is checked by the caller.
///
/// # Arguments
///
/// * `booking` - The current booking (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `now` - The transition timestamp
/// * `settings` - Platform settings (geofence radius, confirmation window)
///
/// # Errors
///
/// Returns an error if:
/// - The booking's status does not permit the command
/// - Deadline arithmetic overflows
pub fn apply_booking(
    booking: &Booking,
    command: BookingCommand,
    actor: Actor,
    now: OffsetDateTime,
    settings: &PlatformSettings,
) -> Result<BookingTransition, CoreError> {
    let operation: &'static str = command.operation();
    let from: BookingStatus = booking.status;
    let mut next: Booking = booking.clone();
    next.updated_at = now;

    match command {
        BookingCommand::Accept => {
            require_status(booking, &[BookingStatus::Pending], operation)?;
            next.provider_response_at = Some(now);
            move_booking(next, from, BookingStatus::Accepted, actor, None, now, None)
        }
        BookingCommand::Decline { reason } => {
            require_status(booking, &[BookingStatus::Pending], operation)?;
            next.provider_response_at = Some(now);
            next.decline_reason.clone_from(&reason);
            move_booking(next, from, BookingStatus::Declined, actor, reason, now, None)
        }
        BookingCommand::CheckIn(reading) => {
            require_status(
                booking,
                &[BookingStatus::Accepted, BookingStatus::InProgress],
                operation,
            )?;
            // Re-checking in keeps the original start.
            if next.actual_start_time.is_none() {
                next.actual_start_time = Some(now);
            }
            let record: CheckInRecord = check_in_record(
                booking,
                CheckType::CheckIn,
                reading,
                acting_user(actor, operation)?,
                now,
                settings,
            );
            move_booking(
                next,
                from,
                BookingStatus::InProgress,
                actor,
                None,
                now,
                Some(record),
            )
        }
        BookingCommand::CheckOut(reading) => {
            require_status(booking, &[BookingStatus::InProgress], operation)?;
            let started_at: OffsetDateTime = booking.actual_start_time.unwrap_or(now);
            next.actual_end_time = Some(now);
            next.actual_duration_hours = Some(elapsed_hours(started_at, now));
            next.confirmation_deadline = Some(
                now.checked_add(settings.confirmation_window)
                    .ok_or_else(|| DomainError::DateArithmeticOverflow {
                        operation: String::from("computing the confirmation deadline"),
                    })?,
            );
            let record: CheckInRecord = check_in_record(
                booking,
                CheckType::CheckOut,
                reading,
                acting_user(actor, operation)?,
                now,
                settings,
            );
            move_booking(
                next,
                from,
                BookingStatus::PendingConfirmation,
                actor,
                None,
                now,
                Some(record),
            )
        }
        BookingCommand::ConfirmAsProvider => {
            require_status(booking, &[BookingStatus::PendingConfirmation], operation)?;
            if booking.provider_confirmed_at.is_some() {
                return Ok(unchanged(booking));
            }
            next.provider_confirmed_at = Some(now);
            next.provider_confirmed_by = actor.user_id();
            complete_if_confirmed(next, now)
        }
        BookingCommand::ConfirmAsParticipant => {
            require_status(booking, &[BookingStatus::PendingConfirmation], operation)?;
            if booking.participant_confirmed_at.is_some() {
                return Ok(unchanged(booking));
            }
            next.participant_confirmed_at = Some(now);
            next.participant_confirmed_by = actor.user_id();
            complete_if_confirmed(next, now)
        }
        BookingCommand::Cancel { reason } => {
            if !booking.status.is_cancellable() {
                return Err(DomainError::InvalidBookingState {
                    operation,
                    status: booking.status,
                }
                .into());
            }
            next.cancelled_at = Some(now);
            next.cancelled_by = actor.user_id();
            next.cancellation_reason.clone_from(&reason);
            move_booking(next, from, BookingStatus::Cancelled, actor, reason, now, None)
        }
    }
}

/// Applies a command to an invoice.
///
/// # Errors
///
/// Returns an error if the invoice's status does not permit the command.
pub fn apply_invoice(
    invoice: &Invoice,
    command: InvoiceCommand,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<InvoiceTransition, CoreError> {
    let operation: &'static str = command.operation();
    let from: InvoiceStatus = invoice.status;
    let mut next: Invoice = invoice.clone();
    next.updated_at = now;

    let (to, reason): (InvoiceStatus, Option<String>) = match command {
        InvoiceCommand::Send => {
            if from != InvoiceStatus::Draft {
                return Err(invoice_state(operation, from));
            }
            next.sent_at = Some(now);
            (InvoiceStatus::Sent, None)
        }
        InvoiceCommand::MarkViewed => match from {
            InvoiceStatus::Sent => {
                next.viewed_at = Some(now);
                (InvoiceStatus::Viewed, None)
            }
            InvoiceStatus::Draft => return Err(invoice_state(operation, from)),
            _ => return Ok(unchanged_invoice(invoice)),
        },
        InvoiceCommand::MarkPaid => {
            if !from.is_payable() {
                return Err(invoice_state(operation, from));
            }
            next.paid_at = Some(now);
            (InvoiceStatus::Paid, None)
        }
        InvoiceCommand::Settle { paid_total } => {
            if !from.is_payable() {
                return Err(invoice_state(operation, from));
            }
            let target: InvoiceStatus = settlement_status(invoice.totals.total_amount, paid_total);
            if target == from {
                return Ok(unchanged_invoice(invoice));
            }
            if target == InvoiceStatus::Paid {
                next.paid_at = Some(now);
            }
            (target, None)
        }
        InvoiceCommand::MarkOverdue { today } => {
            if !invoice.is_past_due(today) {
                return Err(invoice_state(operation, from));
            }
            (InvoiceStatus::Overdue, None)
        }
        InvoiceCommand::Cancel { reason } => {
            if !from.can_transition_to(InvoiceStatus::Cancelled) {
                return Err(invoice_state(operation, from));
            }
            next.cancelled_at = Some(now);
            next.cancellation_reason.clone_from(&reason);
            (InvoiceStatus::Cancelled, reason)
        }
    };

    if !from.can_transition_to(to) {
        return Err(invoice_state(operation, from));
    }
    next.status = to;
    Ok(InvoiceTransition {
        invoice: next,
        changed: true,
        status_change: Some(StatusChange::new(from, to, actor, reason, now)),
    })
}

fn require_status(
    booking: &Booking,
    allowed: &[BookingStatus],
    operation: &'static str,
) -> Result<(), CoreError> {
    if allowed.contains(&booking.status) {
        Ok(())
    } else {
        Err(DomainError::InvalidBookingState {
            operation,
            status: booking.status,
        }
        .into())
    }
}

fn move_booking(
    mut next: Booking,
    from: BookingStatus,
    to: BookingStatus,
    actor: Actor,
    reason: Option<String>,
    now: OffsetDateTime,
    check_in: Option<CheckInRecord>,
) -> Result<BookingTransition, CoreError> {
    from.validate_transition(to)?;
    next.status = to;
    Ok(BookingTransition {
        booking: next,
        changed: true,
        status_change: Some(StatusChange::new(from, to, actor, reason, now)),
        check_in,
    })
}

/// Completes the booking once both parties have confirmed.
///
/// The completion is recorded against the system actor, whichever party
/// confirmed second.
fn complete_if_confirmed(
    next: Booking,
    now: OffsetDateTime,
) -> Result<BookingTransition, CoreError> {
    if next.is_fully_confirmed() {
        return move_booking(
            next,
            BookingStatus::PendingConfirmation,
            BookingStatus::Completed,
            Actor::System,
            None,
            now,
            None,
        );
    }
    Ok(BookingTransition {
        booking: next,
        changed: true,
        status_change: None,
        check_in: None,
    })
}

fn check_in_record(
    booking: &Booking,
    check_type: CheckType,
    reading: GpsReading,
    user_id: i64,
    now: OffsetDateTime,
    settings: &PlatformSettings,
) -> CheckInRecord {
    let geofence: GeofenceCheck = evaluate_geofence(
        booking.service_location,
        reading.location,
        settings.geofence_radius_meters,
    );
    CheckInRecord {
        id: None,
        booking_id: booking.id,
        user_id,
        check_type,
        location: reading.location,
        accuracy_meters: reading.accuracy_meters,
        is_within_geofence: geofence.is_within_geofence,
        distance_from_service_location_meters: geofence.distance_meters,
        photo_url: reading.photo_url,
        recorded_at: now,
    }
}

fn acting_user(actor: Actor, operation: &'static str) -> Result<i64, CoreError> {
    actor
        .user_id()
        .ok_or(CoreError::UserActorRequired { operation })
}

fn unchanged(booking: &Booking) -> BookingTransition {
    BookingTransition {
        booking: booking.clone(),
        changed: false,
        status_change: None,
        check_in: None,
    }
}

fn unchanged_invoice(invoice: &Invoice) -> InvoiceTransition {
    InvoiceTransition {
        invoice: invoice.clone(),
        changed: false,
        status_change: None,
    }
}

fn invoice_state(operation: &'static str, status: InvoiceStatus) -> CoreError {
    CoreError::DomainViolation(DomainError::InvalidInvoiceState { operation, status })
}
