// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Construction of new bookings and invoices.

use crate::command::BookingRequest;
use crate::error::CoreError;
use crate::state::{BookingDraft, InvoiceDraft};
use ndis_market_audit::{Actor, StatusChange};
use ndis_market_domain::{
    Booking, BookingStatus, DomainError, InvoiceStatus, InvoiceTotals, LineItemInput, NewBooking,
    NewInvoice, ParticipantProfile, PlatformSettings, PricedLineItem, ProviderProfile,
    ProviderService, compute_invoice_totals, estimated_total, price_line_items,
    scheduled_duration_hours, select_rate,
};
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime};

/// Prices and schedules a new booking in `pending` status.
///
/// The booking number is supplied by the caller so that it can retry with
/// a fresh number when storage reports a collision.
///
/// # Errors
///
/// Returns an error if:
/// - The service does not belong to the requested provider
/// - The scheduled times are malformed or the duration is not positive
/// - The actor is not a user
pub fn draft_booking(
    request: BookingRequest,
    participant: &ParticipantProfile,
    service: &ProviderService,
    actor: Actor,
    booking_number: String,
    now: OffsetDateTime,
    settings: &PlatformSettings,
) -> Result<BookingDraft, CoreError> {
    let Actor::User { id: user_id, role } = actor else {
        return Err(CoreError::UserActorRequired {
            operation: "create a booking",
        });
    };

    if service.provider_id != request.provider_id {
        return Err(DomainError::InvalidField {
            field: "provider_service_id",
            reason: format!(
                "service {} does not belong to provider {}",
                service.id, request.provider_id
            ),
        }
        .into());
    }

    let duration: Decimal =
        scheduled_duration_hours(&request.scheduled_start_time, &request.scheduled_end_time)?;
    let rate: Decimal = select_rate(service.weekday_rate, service.base_rate);
    let deadline: OffsetDateTime = now
        .checked_add(settings.provider_response_window)
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: String::from("computing the provider response deadline"),
        })?;

    let booking: NewBooking = NewBooking {
        booking_number,
        participant_id: participant.id,
        provider_id: request.provider_id,
        provider_service_id: service.id,
        created_by_user_id: user_id,
        created_by_role: role,
        service_type: request.service_type,
        scheduled_date: request.scheduled_date,
        scheduled_start_time: request.scheduled_start_time,
        scheduled_end_time: request.scheduled_end_time,
        scheduled_duration_hours: duration,
        address: request.address,
        service_location: request.service_location,
        notes: request.notes,
        quoted_rate: rate,
        rate_type: service.rate_type,
        estimated_total: estimated_total(rate, duration),
        provider_response_deadline: deadline,
        created_at: now,
    };

    Ok(BookingDraft {
        booking,
        status_change: StatusChange::created(BookingStatus::Pending, actor, now),
    })
}

/// The parties an invoice is raised between.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceParties<'a> {
    pub provider: &'a ProviderProfile,
    pub participant: &'a ParticipantProfile,
}

/// Prices a new invoice in `draft` status.
///
/// # Errors
///
/// Returns an error if there are no line items, a line is invalid, or the
/// due date overflows.
pub fn draft_invoice(
    parties: InvoiceParties<'_>,
    items: &[LineItemInput],
    notes: Option<String>,
    invoice_number: String,
    actor: Actor,
    now: OffsetDateTime,
    settings: &PlatformSettings,
) -> Result<InvoiceDraft, CoreError> {
    let gst_registered: bool = parties.provider.gst_registered;
    let lines: Vec<PricedLineItem> = price_line_items(items, gst_registered, settings)?;
    let totals: InvoiceTotals = compute_invoice_totals(&lines, gst_registered, settings);
    let due_date: Date = now
        .date()
        .checked_add(Duration::days(settings.invoice_due_days))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: String::from("computing the invoice due date"),
        })?;

    let invoice: NewInvoice = NewInvoice {
        invoice_number,
        provider_id: parties.provider.id,
        participant_id: parties.participant.id,
        bill_to_type: parties.participant.bill_to_type,
        plan_manager_id: parties.participant.plan_manager_id.clone(),
        totals,
        invoice_date: now,
        due_date,
        notes,
        lines,
    };

    Ok(InvoiceDraft {
        invoice,
        status_change: StatusChange::created(InvoiceStatus::Draft, actor, now),
    })
}

/// Builds the single invoice line for a completed booking.
///
/// Hours are the actual duration if recorded, otherwise the scheduled
/// duration. The rate is the rate quoted when the booking was made.
///
/// # Errors
///
/// Returns `DomainError::InvalidBookingState` if the booking is not
/// completed.
pub fn line_item_from_booking(
    booking: &Booking,
    service: &ProviderService,
) -> Result<LineItemInput, CoreError> {
    if booking.status != BookingStatus::Completed {
        return Err(DomainError::InvalidBookingState {
            operation: "invoice",
            status: booking.status,
        }
        .into());
    }

    let hours: Decimal = booking.billable_hours();
    Ok(LineItemInput {
        booking_id: Some(booking.id),
        description: format!(
            "{} - {} ({} hours)",
            booking.service_type,
            service.name,
            hours.normalize()
        ),
        ndis_item_number: service.ndis_item_number.clone(),
        service_date: booking.scheduled_date,
        quantity: hours,
        unit: service.unit.clone(),
        unit_rate: booking.quoted_rate,
        gst_applicable: None,
    })
}
