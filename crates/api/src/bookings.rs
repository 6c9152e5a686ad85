// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking lifecycle operations.
//!
//! Every mutation follows the same path: load the booking, check the actor
//! owns the side it acts for, compute the transition with `apply_booking`,
//! and write it conditionally on the version that was read. Notifications
//! go out only after the write has committed.

use ndis_market::{
    BookingCommand, BookingDraft, BookingRequest, BookingTransition, GpsReading, apply_booking,
    draft_booking,
};
use ndis_market_audit::StatusHistoryEntry;
use ndis_market_domain::{
    Booking, BookingStatus, CheckInRecord, CheckType, Coordinates, DomainError,
    ParticipantProfile, ProviderProfile, ProviderService, Role, User, generate_booking_number,
};
use ndis_market_persistence::{BookingFilter, Persistence, PersistenceError};
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::context::ServiceContext;
use crate::directory::load_user;
use crate::error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::notifications::{DeliveryReceipt, MarketEvent, Recipient};
use crate::request_response::{
    BookingNames, BookingSummary, CheckInInfo, CheckInRequest, CreateBookingRequest,
    ListBookingsQuery, ReasonRequest, StatusHistoryInfo, parse_date,
};

/// How many fresh booking numbers to try before giving up.
pub const BOOKING_NUMBER_ATTEMPTS: usize = 5;

/// Creates a booking in `pending`.
///
/// # Errors
///
/// Returns an error if:
/// - The participant or provider does not exist, or the provider is not active (`NotFound`)
/// - The service does not belong to the provider, or the schedule is invalid (`BadRequest`)
/// - The actor cannot book for the participant (`Forbidden`)
/// - No unique booking number could be allocated (`Conflict`)
pub fn create_booking(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    request: CreateBookingRequest,
) -> Result<BookingSummary, ApiError> {
    let participant: ParticipantProfile =
        booking_participant(persistence, actor, request.participant_id)?;

    let provider: ProviderProfile = persistence
        .get_provider(request.provider_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Provider", request.provider_id))?;
    let provider_user: User = load_user(persistence, provider.user_id)?;
    if !provider_user.is_active() {
        return Err(ApiError::NotFound {
            resource_type: String::from("Provider"),
            message: format!("Provider {} is not currently active", provider.id),
        });
    }

    let service: ProviderService = persistence
        .get_provider_service(request.provider_service_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| {
            ApiError::bad_request(
                "service_belongs_to_provider",
                format!(
                    "Provider service {} does not exist",
                    request.provider_service_id
                ),
            )
        })?;

    let scheduled_date: Date = parse_date("scheduled_date", &request.scheduled_date)?;
    let service_location: Option<Coordinates> =
        service_location(request.latitude, request.longitude)?;

    let booking_request: BookingRequest = BookingRequest {
        provider_id: provider.id,
        provider_service_id: service.id,
        service_type: request.service_type,
        scheduled_date,
        scheduled_start_time: request.scheduled_start_time,
        scheduled_end_time: request.scheduled_end_time,
        address: request.address,
        service_location,
        notes: request.notes,
    };

    let now: OffsetDateTime = ctx.now();
    let mut draft: BookingDraft = draft_booking(
        booking_request,
        &participant,
        &service,
        actor.to_audit_actor(),
        generate_booking_number(now.date()),
        now,
        &ctx.settings,
    )
    .map_err(translate_core_error)?;

    let booking: Booking = insert_with_fresh_number(persistence, &mut draft, now.date())?;
    info!(
        booking_id = booking.id,
        booking_number = %booking.booking_number,
        provider_id = booking.provider_id,
        "Booking requested"
    );

    notify(
        persistence,
        ctx,
        &MarketEvent::BookingRequested {
            booking_number: booking.booking_number.clone(),
            service_type: booking.service_type.clone(),
            scheduled_date: booking.scheduled_date,
        },
        &[provider.user_id],
    );

    summarize(persistence, &booking)
}

/// Provider accepts a pending booking.
///
/// # Errors
///
/// Returns `NotFound`, `Forbidden`, `BadRequest` unless pending, or
/// `Conflict` if the booking changed concurrently.
pub fn accept_booking(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    booking_id: i64,
) -> Result<BookingSummary, ApiError> {
    let (booking, _): (Booking, BookingTransition) = transition(
        persistence,
        ctx,
        actor,
        booking_id,
        BookingCommand::Accept,
        AuthorizationService::authorize_booking_provider,
    )?;

    let (participant_user, _): (Option<i64>, Option<i64>) = party_user_ids(persistence, &booking);
    notify(
        persistence,
        ctx,
        &MarketEvent::BookingAccepted {
            booking_number: booking.booking_number.clone(),
        },
        &participant_user.into_iter().collect::<Vec<i64>>(),
    );
    summarize(persistence, &booking)
}

/// Provider declines a pending booking.
///
/// # Errors
///
/// Same as [`accept_booking`].
pub fn decline_booking(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    booking_id: i64,
    request: ReasonRequest,
) -> Result<BookingSummary, ApiError> {
    let (booking, _): (Booking, BookingTransition) = transition(
        persistence,
        ctx,
        actor,
        booking_id,
        BookingCommand::Decline {
            reason: request.reason.clone(),
        },
        AuthorizationService::authorize_booking_provider,
    )?;

    let (participant_user, _): (Option<i64>, Option<i64>) = party_user_ids(persistence, &booking);
    notify(
        persistence,
        ctx,
        &MarketEvent::BookingDeclined {
            booking_number: booking.booking_number.clone(),
            reason: request.reason,
        },
        &participant_user.into_iter().collect::<Vec<i64>>(),
    );
    summarize(persistence, &booking)
}

/// Provider records a GPS check-in or check-out.
///
/// The check-in record is written whatever the geofence result.
///
/// # Errors
///
/// Returns `BadRequest` for an unknown check type, out-of-range coordinates
/// or a status that does not allow the event, plus the errors of
/// [`accept_booking`].
pub fn check_in(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    booking_id: i64,
    request: CheckInRequest,
) -> Result<BookingSummary, ApiError> {
    let check_type: CheckType = request
        .check_type
        .parse()
        .map_err(translate_domain_error)?;
    let reading: GpsReading = GpsReading {
        location: Coordinates::new(request.latitude, request.longitude)
            .map_err(translate_domain_error)?,
        accuracy_meters: request.accuracy_meters,
        photo_url: request.photo_url,
    };
    let command: BookingCommand = match check_type {
        CheckType::CheckIn => BookingCommand::CheckIn(reading),
        CheckType::CheckOut => BookingCommand::CheckOut(reading),
    };

    let (booking, applied): (Booking, BookingTransition) = transition(
        persistence,
        ctx,
        actor,
        booking_id,
        command,
        AuthorizationService::authorize_booking_provider,
    )?;

    if let Some(record) = &applied.check_in {
        info!(
            booking_id,
            check_type = %record.check_type.as_str(),
            within_geofence = ?record.is_within_geofence,
            distance_meters = ?record.distance_from_service_location_meters,
            "GPS event recorded"
        );
    }

    if check_type == CheckType::CheckOut {
        let (participant_user, provider_user): (Option<i64>, Option<i64>) =
            party_user_ids(persistence, &booking);
        notify(
            persistence,
            ctx,
            &MarketEvent::ConfirmationRequested {
                booking_number: booking.booking_number.clone(),
            },
            &[participant_user, provider_user]
                .into_iter()
                .flatten()
                .collect::<Vec<i64>>(),
        );
    }
    summarize(persistence, &booking)
}

/// Records the caller's side of the dual confirmation.
///
/// Providers confirm as the provider and participants as the participant.
/// The booking completes once both sides have confirmed; a repeated
/// confirmation changes nothing.
///
/// # Errors
///
/// Returns `Forbidden` for other roles or non-owners, `BadRequest` unless
/// the booking awaits confirmation, and `Conflict` if it changed
/// concurrently.
pub fn confirm_booking(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    booking_id: i64,
) -> Result<BookingSummary, ApiError> {
    let (command, authorize): (BookingCommand, Authorize) = match actor.role {
        Role::Provider => (
            BookingCommand::ConfirmAsProvider,
            AuthorizationService::authorize_booking_provider as Authorize,
        ),
        Role::Participant => (
            BookingCommand::ConfirmAsParticipant,
            AuthorizationService::authorize_booking_participant as Authorize,
        ),
        Role::Coordinator | Role::Admin => {
            return Err(AuthError::Forbidden {
                action: String::from("confirm booking"),
                reason: String::from("only the provider or the participant can confirm"),
            }
            .into());
        }
    };

    let (booking, applied): (Booking, BookingTransition) =
        transition(persistence, ctx, actor, booking_id, command, authorize)?;

    if applied.completed() {
        info!(booking_id, "Booking completed after dual confirmation");
        let (participant_user, provider_user): (Option<i64>, Option<i64>) =
            party_user_ids(persistence, &booking);
        notify(
            persistence,
            ctx,
            &MarketEvent::BookingCompleted {
                booking_number: booking.booking_number.clone(),
            },
            &[participant_user, provider_user]
                .into_iter()
                .flatten()
                .collect::<Vec<i64>>(),
        );
    }
    summarize(persistence, &booking)
}

/// Either party cancels a booking that has not finished.
///
/// # Errors
///
/// Returns `BadRequest` for a completed, declined or cancelled booking,
/// plus the errors of [`accept_booking`].
pub fn cancel_booking(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    booking_id: i64,
    request: ReasonRequest,
) -> Result<BookingSummary, ApiError> {
    let (booking, _): (Booking, BookingTransition) = transition(
        persistence,
        ctx,
        actor,
        booking_id,
        BookingCommand::Cancel {
            reason: request.reason.clone(),
        },
        AuthorizationService::authorize_booking_party,
    )?;

    let (participant_user, provider_user): (Option<i64>, Option<i64>) =
        party_user_ids(persistence, &booking);
    // Tell whichever side did not cancel; an admin cancel tells both.
    let recipients: Vec<i64> = [participant_user, provider_user]
        .into_iter()
        .flatten()
        .filter(|user_id| *user_id != actor.user_id)
        .collect();
    notify(
        persistence,
        ctx,
        &MarketEvent::BookingCancelled {
            booking_number: booking.booking_number.clone(),
            reason: request.reason,
        },
        &recipients,
    );
    summarize(persistence, &booking)
}

/// Returns one booking.
///
/// # Errors
///
/// Returns `NotFound` or `Forbidden`.
pub fn get_booking(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    booking_id: i64,
) -> Result<BookingSummary, ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    AuthorizationService::authorize_booking_view(actor, &booking)?;
    summarize(persistence, &booking)
}

/// Lists the bookings visible to the actor.
///
/// Participants and providers see their own bookings; coordinators and
/// admins see all of them.
///
/// # Errors
///
/// Returns `BadRequest` for malformed filters.
pub fn list_bookings(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    query: &ListBookingsQuery,
) -> Result<Vec<BookingSummary>, ApiError> {
    let mut filter: BookingFilter = BookingFilter {
        status: query
            .status
            .as_deref()
            .map(str::parse::<BookingStatus>)
            .transpose()
            .map_err(translate_domain_error)?,
        from_date: query
            .from_date
            .as_deref()
            .map(|d| parse_date("from_date", d))
            .transpose()?,
        to_date: query
            .to_date
            .as_deref()
            .map(|d| parse_date("to_date", d))
            .transpose()?,
        ..BookingFilter::default()
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

    let bookings: Vec<Booking> = persistence
        .list_bookings(&filter)
        .map_err(translate_persistence_error)?;
    bookings
        .iter()
        .map(|booking| summarize(persistence, booking))
        .collect()
}

/// Returns a booking's status history, oldest first.
///
/// # Errors
///
/// Returns `NotFound` or `Forbidden`.
pub fn booking_history(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    booking_id: i64,
) -> Result<Vec<StatusHistoryInfo>, ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    AuthorizationService::authorize_booking_view(actor, &booking)?;
    let history: Vec<StatusHistoryEntry<BookingStatus>> = persistence
        .booking_history(booking_id)
        .map_err(translate_persistence_error)?;
    Ok(history.iter().map(StatusHistoryInfo::from).collect())
}

/// Returns a booking's GPS events, oldest first.
///
/// # Errors
///
/// Returns `NotFound` or `Forbidden`.
pub fn list_check_ins(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    booking_id: i64,
) -> Result<Vec<CheckInInfo>, ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    AuthorizationService::authorize_booking_view(actor, &booking)?;
    let records: Vec<CheckInRecord> = persistence
        .list_check_ins(booking_id)
        .map_err(translate_persistence_error)?;
    Ok(records.iter().map(CheckInInfo::from).collect())
}

type Authorize = fn(&AuthenticatedActor, &Booking, &str) -> Result<(), AuthError>;

/// Loads, authorizes, applies and persists one booking command.
fn transition(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    booking_id: i64,
    command: BookingCommand,
    authorize: Authorize,
) -> Result<(Booking, BookingTransition), ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    let operation: &'static str = command.operation();
    authorize(actor, &booking, operation)?;

    let applied: BookingTransition = apply_booking(
        &booking,
        command,
        actor.to_audit_actor(),
        ctx.now(),
        &ctx.settings,
    )
    .map_err(translate_core_error)?;

    let stored: Booking = persistence
        .persist_booking_transition(booking.version, &applied)
        .map_err(|e| {
            if matches!(e, PersistenceError::ConcurrentModification { .. }) {
                warn!(booking_id, operation, "Booking changed while being updated");
            }
            translate_persistence_error(e)
        })?;

    if let Some(change) = &applied.status_change {
        info!(
            booking_id,
            from = ?change.from.map(|s| s.as_str()),
            to = change.to.as_str(),
            by = ?actor.user_id,
            "Booking status changed"
        );
    }
    Ok((stored, applied))
}

fn insert_with_fresh_number(
    persistence: &mut Persistence,
    draft: &mut BookingDraft,
    today: Date,
) -> Result<Booking, ApiError> {
    for attempt in 1..=BOOKING_NUMBER_ATTEMPTS {
        match persistence.insert_booking(draft) {
            Ok(booking) => return Ok(booking),
            Err(PersistenceError::UniqueViolation(_)) => {
                debug!(
                    attempt,
                    booking_number = %draft.booking.booking_number,
                    "Booking number taken, retrying"
                );
                draft.booking.booking_number = generate_booking_number(today);
            }
            Err(other) => return Err(translate_persistence_error(other)),
        }
    }
    Err(ApiError::Conflict {
        message: format!(
            "Could not allocate a unique booking number after {BOOKING_NUMBER_ATTEMPTS} attempts"
        ),
    })
}

fn booking_participant(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    requested: Option<i64>,
) -> Result<ParticipantProfile, ApiError> {
    let participant_id: i64 = match actor.role {
        Role::Participant => {
            let own: i64 = actor.participant_id.ok_or_else(|| ApiError::NotFound {
                resource_type: String::from("Participant"),
                message: format!("User {} has no participant profile", actor.user_id),
            })?;
            if requested.is_some_and(|id| id != own) {
                return Err(AuthError::Forbidden {
                    action: String::from("create booking"),
                    reason: String::from("participants can only book for themselves"),
                }
                .into());
            }
            own
        }
        Role::Coordinator | Role::Admin => requested.ok_or_else(|| {
            translate_domain_error(DomainError::InvalidField {
                field: "participant_id",
                reason: String::from("required when booking on behalf of a participant"),
            })
        })?,
        Role::Provider => {
            return Err(AuthError::Forbidden {
                action: String::from("create booking"),
                reason: String::from("providers cannot request bookings"),
            }
            .into());
        }
    };

    persistence
        .get_participant(participant_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Participant", participant_id))
}

fn service_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinates>, ApiError> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
            .map(Some)
            .map_err(translate_domain_error),
        (None, None) => Ok(None),
        _ => Err(ApiError::bad_request(
            "coordinates_in_range",
            "latitude and longitude must be given together",
        )),
    }
}

pub(crate) fn load_booking(
    persistence: &mut Persistence,
    booking_id: i64,
) -> Result<Booking, ApiError> {
    persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Booking", booking_id))
}

fn summarize(persistence: &mut Persistence, booking: &Booking) -> Result<BookingSummary, ApiError> {
    let participant: ParticipantProfile = persistence
        .get_participant(booking.participant_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Participant", booking.participant_id))?;
    let participant_user: User = load_user(persistence, participant.user_id)?;
    let provider: ProviderProfile = persistence
        .get_provider(booking.provider_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Provider", booking.provider_id))?;
    let service: ProviderService = persistence
        .get_provider_service(booking.provider_service_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Provider service", booking.provider_service_id))?;

    Ok(BookingSummary::new(
        booking,
        BookingNames {
            participant_name: participant_user.display_name,
            provider_name: provider.business_name,
            service_name: service.name,
        },
    ))
}

/// Returns the user ids behind the booking's participant and provider.
///
/// Lookup failures yield `None`; these ids only feed notifications.
fn party_user_ids(persistence: &mut Persistence, booking: &Booking) -> (Option<i64>, Option<i64>) {
    let participant: Option<i64> = persistence
        .get_participant(booking.participant_id)
        .ok()
        .flatten()
        .map(|p| p.user_id);
    let provider: Option<i64> = persistence
        .get_provider(booking.provider_id)
        .ok()
        .flatten()
        .map(|p| p.user_id);
    (participant, provider)
}

/// Sends an event to each user. Never fails.
pub(crate) fn notify(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    event: &MarketEvent,
    user_ids: &[i64],
) {
    for &user_id in user_ids {
        match persistence.get_user(user_id) {
            Ok(Some(user)) => {
                let receipts: Vec<DeliveryReceipt> = ctx.notifications.dispatch(
                    event,
                    &Recipient {
                        email: user.email,
                        phone: user.phone,
                    },
                );
                debug!(user_id, event = event.name(), delivered = receipts.len(), "Notified user");
            }
            Ok(None) => warn!(user_id, event = event.name(), "Notification recipient missing"),
            Err(e) => warn!(
                user_id,
                event = event.name(),
                error = %e,
                "Notification lookup failed"
            ),
        }
    }
}
