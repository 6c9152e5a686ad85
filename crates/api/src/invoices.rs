// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice creation and status operations.

use ndis_market::{
    InvoiceCommand, InvoiceDraft, InvoiceParties, InvoiceTransition, apply_invoice, draft_invoice,
    line_item_from_booking,
};
use ndis_market_audit::StatusHistoryEntry;
use ndis_market_domain::{
    Booking, BookingStatus, DomainError, Invoice, InvoiceLineItem, InvoiceStatus, LineItemInput,
    ParticipantProfile, ProviderProfile, ProviderService, Role, format_invoice_number,
};
use ndis_market_persistence::{InvoiceFilter, Persistence, PersistenceError};
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::bookings::{load_booking, notify};
use crate::context::ServiceContext;
use crate::error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::notifications::MarketEvent;
use crate::request_response::{
    CreateInvoiceRequest, InvoiceDetail, InvoiceFromBookingRequest, InvoiceInfo, LineItemInfo,
    LineItemRequest, ListInvoicesQuery, OverdueSweepResponse, ReasonRequest, StatusHistoryInfo,
    parse_date,
};

/// How many consecutive sequence numbers to try before giving up.
pub const INVOICE_NUMBER_ATTEMPTS: usize = 5;

const DEFAULT_UNIT: &str = "hour";

/// Creates a draft invoice from explicit line items.
///
/// # Errors
///
/// Returns an error if:
/// - The provider, participant or a referenced booking does not exist (`NotFound`)
/// - The actor does not own the provider, or a referenced booking belongs
///   to another provider (`Forbidden`)
/// - There are no lines, a quantity is not positive, a rate is negative,
///   or a referenced booking is for another participant, not completed or
///   already invoiced (`BadRequest`)
/// - No free invoice number was found (`Conflict`)
pub fn create_invoice(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    request: CreateInvoiceRequest,
) -> Result<InvoiceDetail, ApiError> {
    let provider: ProviderProfile = load_provider(persistence, request.provider_id)?;
    AuthorizationService::authorize_provider(actor, provider.id, "create invoice")?;
    let participant: ParticipantProfile = load_participant(persistence, request.participant_id)?;

    let items: Vec<LineItemInput> = request
        .line_items
        .into_iter()
        .map(line_item_input)
        .collect::<Result<Vec<LineItemInput>, ApiError>>()?;
    let mut billed: Vec<i64> = Vec::new();
    for booking_id in items.iter().filter_map(|item| item.booking_id) {
        if billed.contains(&booking_id) {
            return Err(translate_domain_error(DomainError::BookingAlreadyInvoiced {
                booking_id,
            }));
        }
        ensure_billable_booking(persistence, booking_id, &provider, &participant)?;
        billed.push(booking_id);
    }

    let invoice: Invoice = create_numbered(
        persistence,
        ctx,
        actor,
        InvoiceParties {
            provider: &provider,
            participant: &participant,
        },
        &items,
        request.notes,
    )?;
    invoice_detail(persistence, &invoice)
}

/// Creates a draft invoice billing one completed booking.
///
/// # Errors
///
/// Returns `BadRequest` if the booking is not completed or is already
/// invoiced, plus the errors of [`create_invoice`].
pub fn create_invoice_from_booking(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    booking_id: i64,
    request: InvoiceFromBookingRequest,
) -> Result<InvoiceDetail, ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    AuthorizationService::authorize_booking_provider(actor, &booking, "invoice booking")?;

    let service: ProviderService = persistence
        .get_provider_service(booking.provider_service_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Provider service", booking.provider_service_id))?;
    let item: LineItemInput =
        line_item_from_booking(&booking, &service).map_err(translate_core_error)?;
    ensure_not_invoiced(persistence, booking.id)?;

    let provider: ProviderProfile = load_provider(persistence, booking.provider_id)?;
    let participant: ParticipantProfile = load_participant(persistence, booking.participant_id)?;

    let invoice: Invoice = create_numbered(
        persistence,
        ctx,
        actor,
        InvoiceParties {
            provider: &provider,
            participant: &participant,
        },
        &[item],
        request.notes,
    )?;
    info!(
        invoice_id = invoice.id,
        booking_id, "Invoice created from completed booking"
    );
    invoice_detail(persistence, &invoice)
}

/// Issues a draft invoice to the participant.
///
/// # Errors
///
/// Returns `Forbidden` unless the actor owns the provider, `BadRequest`
/// unless the invoice is a draft.
pub fn send_invoice(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    invoice_id: i64,
) -> Result<InvoiceInfo, ApiError> {
    let invoice: Invoice = transition(
        persistence,
        ctx,
        actor,
        invoice_id,
        InvoiceCommand::Send,
        AuthorizationService::authorize_invoice_provider,
    )?;

    if let Some(participant) = persistence
        .get_participant(invoice.participant_id)
        .ok()
        .flatten()
    {
        notify(
            persistence,
            ctx,
            &MarketEvent::InvoiceSent {
                invoice_number: invoice.invoice_number.clone(),
                total_amount: invoice.totals.total_amount,
                due_date: invoice.due_date,
            },
            &[participant.user_id],
        );
    }
    Ok(InvoiceInfo::from(&invoice))
}

/// Participant opens a sent invoice. Later views change nothing.
///
/// # Errors
///
/// Returns `Forbidden` unless the actor is the invoiced participant,
/// `BadRequest` for a draft.
pub fn view_invoice(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    invoice_id: i64,
) -> Result<InvoiceInfo, ApiError> {
    let invoice: Invoice = transition(
        persistence,
        ctx,
        actor,
        invoice_id,
        InvoiceCommand::MarkViewed,
        AuthorizationService::authorize_invoice_participant,
    )?;
    Ok(InvoiceInfo::from(&invoice))
}

/// Provider records payment received outside the gateway.
///
/// # Errors
///
/// Returns `Forbidden` unless the actor owns the provider, `BadRequest`
/// unless the invoice is awaiting payment.
pub fn mark_invoice_paid(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    invoice_id: i64,
) -> Result<InvoiceInfo, ApiError> {
    let invoice: Invoice = transition(
        persistence,
        ctx,
        actor,
        invoice_id,
        InvoiceCommand::MarkPaid,
        AuthorizationService::authorize_invoice_provider,
    )?;
    Ok(InvoiceInfo::from(&invoice))
}

/// Provider withdraws an invoice.
///
/// # Errors
///
/// Returns `Forbidden` unless the actor owns the provider, `BadRequest`
/// for a paid or cancelled invoice.
pub fn cancel_invoice(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    invoice_id: i64,
    request: ReasonRequest,
) -> Result<InvoiceInfo, ApiError> {
    let invoice: Invoice = transition(
        persistence,
        ctx,
        actor,
        invoice_id,
        InvoiceCommand::Cancel {
            reason: request.reason,
        },
        AuthorizationService::authorize_invoice_provider,
    )?;
    Ok(InvoiceInfo::from(&invoice))
}

/// Moves every issued invoice past its due date to `overdue`.
///
/// Invoices that change status while the sweep runs are skipped.
///
/// # Errors
///
/// Returns `Forbidden` for non-admins.
pub fn mark_overdue(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
) -> Result<OverdueSweepResponse, ApiError> {
    AuthorizationService::require_admin(actor, "mark invoices overdue")?;
    let now: OffsetDateTime = ctx.now();
    let today: Date = now.date();

    let candidates: Vec<Invoice> = persistence
        .list_overdue_candidates(today)
        .map_err(translate_persistence_error)?;

    let mut marked: Vec<String> = Vec::new();
    for invoice in &candidates {
        let applied: InvoiceTransition = match apply_invoice(
            invoice,
            InvoiceCommand::MarkOverdue { today },
            actor.to_audit_actor(),
            now,
        ) {
            Ok(applied) => applied,
            Err(e) => {
                debug!(invoice_id = invoice.id, error = %e, "Invoice not eligible for overdue");
                continue;
            }
        };
        match persistence.persist_invoice_transition(invoice.status, &applied) {
            Ok(_) => marked.push(invoice.invoice_number.clone()),
            Err(PersistenceError::ConcurrentModification { id, .. }) => {
                warn!(invoice_id = id, "Invoice changed during overdue sweep, skipped");
            }
            Err(e) => return Err(translate_persistence_error(e)),
        }
    }

    info!(count = marked.len(), "Overdue sweep finished");
    Ok(OverdueSweepResponse {
        count: marked.len(),
        marked_overdue: marked,
    })
}

/// Returns an invoice with its line items.
///
/// # Errors
///
/// Returns `NotFound` or `Forbidden`.
pub fn get_invoice(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    invoice_id: i64,
) -> Result<InvoiceDetail, ApiError> {
    let invoice: Invoice = load_invoice(persistence, invoice_id)?;
    AuthorizationService::authorize_invoice_view(actor, &invoice)?;
    invoice_detail(persistence, &invoice)
}

/// Lists the invoices visible to the actor, newest first.
///
/// # Errors
///
/// Returns `BadRequest` for an unknown status filter.
pub fn list_invoices(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    query: &ListInvoicesQuery,
) -> Result<Vec<InvoiceInfo>, ApiError> {
    let mut filter: InvoiceFilter = InvoiceFilter {
        status: query
            .status
            .as_deref()
            .map(str::parse::<InvoiceStatus>)
            .transpose()
            .map_err(translate_domain_error)?,
        ..InvoiceFilter::default()
    };
    match actor.role {
        Role::Participant => match actor.participant_id {
            Some(id) => filter.participant_id = Some(id),
            None => return Ok(Vec::new()),
        },
        Role::Provider => match actor.provider_id {
            Some(id) => filter.provider_id = Some(id),
            None => return Ok(Vec::new()),
        },
        Role::Coordinator | Role::Admin => {}
    }

    let invoices: Vec<Invoice> = persistence
        .list_invoices(&filter)
        .map_err(translate_persistence_error)?;
    Ok(invoices.iter().map(InvoiceInfo::from).collect())
}

/// Returns an invoice's status history, oldest first.
///
/// # Errors
///
/// Returns `NotFound` or `Forbidden`.
pub fn invoice_history(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    invoice_id: i64,
) -> Result<Vec<StatusHistoryInfo>, ApiError> {
    let invoice: Invoice = load_invoice(persistence, invoice_id)?;
    AuthorizationService::authorize_invoice_view(actor, &invoice)?;
    let history: Vec<StatusHistoryEntry<InvoiceStatus>> = persistence
        .invoice_history(invoice_id)
        .map_err(translate_persistence_error)?;
    Ok(history.iter().map(StatusHistoryInfo::from).collect())
}

type Authorize = fn(&AuthenticatedActor, &Invoice, &str) -> Result<(), AuthError>;

fn transition(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    invoice_id: i64,
    command: InvoiceCommand,
    authorize: Authorize,
) -> Result<Invoice, ApiError> {
    let invoice: Invoice = load_invoice(persistence, invoice_id)?;
    authorize(actor, &invoice, command.operation())?;

    let applied: InvoiceTransition =
        apply_invoice(&invoice, command, actor.to_audit_actor(), ctx.now())
            .map_err(translate_core_error)?;
    let stored: Invoice = persistence
        .persist_invoice_transition(invoice.status, &applied)
        .map_err(translate_persistence_error)?;

    if let Some(change) = &applied.status_change {
        info!(
            invoice_id,
            from = ?change.from.map(|s| s.as_str()),
            to = change.to.as_str(),
            by = actor.user_id,
            "Invoice status changed"
        );
    }
    Ok(stored)
}

/// Allocates `INV-{YYYYMM}-{seq}` and inserts the invoice, moving to the
/// next sequence number when the current one is taken.
fn create_numbered(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    parties: InvoiceParties<'_>,
    items: &[LineItemInput],
    notes: Option<String>,
) -> Result<Invoice, ApiError> {
    let now: OffsetDateTime = ctx.now();
    let today: Date = now.date();
    let issued: i64 = persistence
        .count_provider_invoices_in_month(parties.provider.id, today)
        .map_err(translate_persistence_error)?;
    let mut sequence: u32 = u32::try_from(issued + 1).map_err(|_| ApiError::Internal {
        message: format!("Invoice count {issued} is out of range"),
    })?;

    let mut draft: InvoiceDraft = draft_invoice(
        parties,
        items,
        notes,
        format_invoice_number(today, sequence),
        actor.to_audit_actor(),
        now,
        &ctx.settings,
    )
    .map_err(translate_core_error)?;

    for _ in 0..INVOICE_NUMBER_ATTEMPTS {
        match persistence.insert_invoice(&draft) {
            Ok(invoice) => {
                info!(
                    invoice_id = invoice.id,
                    invoice_number = %invoice.invoice_number,
                    total = %invoice.totals.total_amount,
                    "Invoice created"
                );
                return Ok(invoice);
            }
            Err(PersistenceError::UniqueViolation(_)) => {
                debug!(
                    invoice_number = %draft.invoice.invoice_number,
                    "Invoice number taken, trying the next sequence"
                );
                sequence += 1;
                draft.invoice.invoice_number = format_invoice_number(today, sequence);
            }
            Err(other) => return Err(translate_persistence_error(other)),
        }
    }
    Err(ApiError::Conflict {
        message: format!(
            "Could not allocate an invoice number after {INVOICE_NUMBER_ATTEMPTS} attempts"
        ),
    })
}

fn line_item_input(item: LineItemRequest) -> Result<LineItemInput, ApiError> {
    Ok(LineItemInput {
        booking_id: item.booking_id,
        description: item.description,
        ndis_item_number: item.ndis_item_number,
        service_date: parse_date("service_date", &item.service_date)?,
        quantity: item.quantity,
        unit: item.unit.unwrap_or_else(|| String::from(DEFAULT_UNIT)),
        unit_rate: item.unit_rate,
        gst_applicable: item.gst_applicable,
    })
}

/// A line item may only bill a completed, uninvoiced booking between the
/// invoice's own provider and participant.
fn ensure_billable_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    provider: &ProviderProfile,
    participant: &ParticipantProfile,
) -> Result<(), ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    if booking.provider_id != provider.id {
        return Err(ApiError::Forbidden {
            action: String::from("invoice booking"),
            reason: format!("booking {booking_id} belongs to another provider"),
        });
    }
    if booking.participant_id != participant.id {
        return Err(ApiError::bad_request(
            "booking_participant_mismatch",
            format!("Booking {booking_id} is not for participant {}", participant.id),
        ));
    }
    if booking.status != BookingStatus::Completed {
        return Err(translate_domain_error(DomainError::InvalidBookingState {
            operation: "invoice",
            status: booking.status,
        }));
    }
    ensure_not_invoiced(persistence, booking_id)
}

fn ensure_not_invoiced(persistence: &mut Persistence, booking_id: i64) -> Result<(), ApiError> {
    if persistence
        .is_booking_invoiced(booking_id)
        .map_err(translate_persistence_error)?
    {
        return Err(translate_domain_error(DomainError::BookingAlreadyInvoiced {
            booking_id,
        }));
    }
    Ok(())
}

pub(crate) fn load_invoice(
    persistence: &mut Persistence,
    invoice_id: i64,
) -> Result<Invoice, ApiError> {
    persistence
        .get_invoice(invoice_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Invoice", invoice_id))
}

pub(crate) fn load_provider(
    persistence: &mut Persistence,
    provider_id: i64,
) -> Result<ProviderProfile, ApiError> {
    persistence
        .get_provider(provider_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Provider", provider_id))
}

fn load_participant(
    persistence: &mut Persistence,
    participant_id: i64,
) -> Result<ParticipantProfile, ApiError> {
    persistence
        .get_participant(participant_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Participant", participant_id))
}

fn invoice_detail(
    persistence: &mut Persistence,
    invoice: &Invoice,
) -> Result<InvoiceDetail, ApiError> {
    let lines: Vec<InvoiceLineItem> = persistence
        .get_invoice_lines(invoice.id)
        .map_err(translate_persistence_error)?;
    Ok(InvoiceDetail {
        invoice: InvoiceInfo::from(invoice),
        line_items: lines.iter().map(LineItemInfo::from).collect(),
    })
}
