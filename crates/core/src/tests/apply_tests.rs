// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    PROVIDER_USER_ID, create_test_booking, now, off_site_reading, on_site_reading,
    participant_actor, provider_actor,
};
use crate::{BookingCommand, BookingTransition, CoreError, apply_booking};
use ndis_market_audit::Actor;
use ndis_market_domain::{Booking, BookingStatus, CheckType, DomainError, PlatformSettings};
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

#[test]
fn test_accept_sets_response_time_and_history() {
    let booking: Booking = create_test_booking(BookingStatus::Pending);
    let settings = PlatformSettings::default();

    let transition: BookingTransition = apply_booking(
        &booking,
        BookingCommand::Accept,
        provider_actor(),
        now(),
        &settings,
    )
    .unwrap();

    assert_eq!(transition.booking.status, BookingStatus::Accepted);
    assert_eq!(transition.booking.provider_response_at, Some(now()));
    let change = transition.status_change.unwrap();
    assert_eq!(change.from, Some(BookingStatus::Pending));
    assert_eq!(change.to, BookingStatus::Accepted);
    assert_eq!(change.actor, provider_actor());
}

#[test]
fn test_decline_records_reason() {
    let booking: Booking = create_test_booking(BookingStatus::Pending);
    let transition: BookingTransition = apply_booking(
        &booking,
        BookingCommand::Decline {
            reason: Some(String::from("No staff available")),
        },
        provider_actor(),
        now(),
        &PlatformSettings::default(),
    )
    .unwrap();

    assert_eq!(transition.booking.status, BookingStatus::Declined);
    assert_eq!(
        transition.booking.decline_reason.as_deref(),
        Some("No staff available")
    );
    assert_eq!(
        transition.status_change.unwrap().reason.as_deref(),
        Some("No staff available")
    );
}

#[test]
fn test_accept_and_decline_require_pending() {
    for status in [
        BookingStatus::Accepted,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Declined,
    ] {
        let booking: Booking = create_test_booking(status);
        let accept = apply_booking(
            &booking,
            BookingCommand::Accept,
            provider_actor(),
            now(),
            &PlatformSettings::default(),
        );
        assert_eq!(
            accept,
            Err(CoreError::DomainViolation(DomainError::InvalidBookingState {
                operation: "accept",
                status,
            }))
        );
        let decline = apply_booking(
            &booking,
            BookingCommand::Decline { reason: None },
            provider_actor(),
            now(),
            &PlatformSettings::default(),
        );
        assert!(decline.is_err());
    }
}

#[test]
fn test_check_in_inside_geofence() {
    let booking: Booking = create_test_booking(BookingStatus::Accepted);
    let transition: BookingTransition = apply_booking(
        &booking,
        BookingCommand::CheckIn(on_site_reading()),
        provider_actor(),
        now(),
        &PlatformSettings::default(),
    )
    .unwrap();

    assert_eq!(transition.booking.status, BookingStatus::InProgress);
    assert_eq!(transition.booking.actual_start_time, Some(now()));
    let record = transition.check_in.unwrap();
    assert_eq!(record.check_type, CheckType::CheckIn);
    assert_eq!(record.user_id, PROVIDER_USER_ID);
    assert_eq!(record.is_within_geofence, Some(true));
    assert!(record.distance_from_service_location_meters.unwrap() < 100.0);
}

#[test]
fn test_check_in_outside_geofence_is_recorded_not_rejected() {
    let booking: Booking = create_test_booking(BookingStatus::Accepted);
    let transition: BookingTransition = apply_booking(
        &booking,
        BookingCommand::CheckIn(off_site_reading()),
        provider_actor(),
        now(),
        &PlatformSettings::default(),
    )
    .unwrap();

    assert_eq!(transition.booking.status, BookingStatus::InProgress);
    let record = transition.check_in.unwrap();
    assert_eq!(record.is_within_geofence, Some(false));
    assert!(record.distance_from_service_location_meters.unwrap() > 100.0);
    assert!(record.photo_url.is_some());
}

#[test]
fn test_check_in_without_service_location_has_null_geofence() {
    let mut booking: Booking = create_test_booking(BookingStatus::Accepted);
    booking.service_location = None;

    let transition: BookingTransition = apply_booking(
        &booking,
        BookingCommand::CheckIn(on_site_reading()),
        provider_actor(),
        now(),
        &PlatformSettings::default(),
    )
    .unwrap();

    let record = transition.check_in.unwrap();
    assert_eq!(record.is_within_geofence, None);
    assert_eq!(record.distance_from_service_location_meters, None);
}

#[test]
fn test_repeat_check_in_keeps_original_start() {
    let mut booking: Booking = create_test_booking(BookingStatus::InProgress);
    let first_start: OffsetDateTime = now() - Duration::minutes(30);
    booking.actual_start_time = Some(first_start);

    let transition: BookingTransition = apply_booking(
        &booking,
        BookingCommand::CheckIn(on_site_reading()),
        provider_actor(),
        now(),
        &PlatformSettings::default(),
    )
    .unwrap();

    assert_eq!(transition.booking.actual_start_time, Some(first_start));
    let change = transition.status_change.unwrap();
    assert_eq!(change.from, Some(BookingStatus::InProgress));
    assert_eq!(change.to, BookingStatus::InProgress);
}

#[test]
fn test_check_in_requires_accepted_or_in_progress() {
    for status in [
        BookingStatus::Pending,
        BookingStatus::PendingConfirmation,
        BookingStatus::Completed,
    ] {
        let booking: Booking = create_test_booking(status);
        let result = apply_booking(
            &booking,
            BookingCommand::CheckIn(on_site_reading()),
            provider_actor(),
            now(),
            &PlatformSettings::default(),
        );
        assert!(matches!(
            result,
            Err(CoreError::DomainViolation(
                DomainError::InvalidBookingState { .. }
            ))
        ));
    }
}

#[test]
fn test_check_out_computes_duration_and_deadline() {
    let mut booking: Booking = create_test_booking(BookingStatus::InProgress);
    booking.actual_start_time = Some(now() - Duration::minutes(150));
    let settings = PlatformSettings::default();

    let transition: BookingTransition = apply_booking(
        &booking,
        BookingCommand::CheckOut(on_site_reading()),
        provider_actor(),
        now(),
        &settings,
    )
    .unwrap();

    assert_eq!(transition.booking.status, BookingStatus::PendingConfirmation);
    assert_eq!(transition.booking.actual_end_time, Some(now()));
    assert_eq!(
        transition.booking.actual_duration_hours,
        Some(Decimal::new(25, 1))
    );
    assert_eq!(
        transition.booking.confirmation_deadline,
        Some(now() + Duration::hours(48))
    );
    assert_eq!(
        transition.check_in.unwrap().check_type,
        CheckType::CheckOut
    );
}

#[test]
fn test_check_out_before_check_in_rejected() {
    let booking: Booking = create_test_booking(BookingStatus::Accepted);
    let result = apply_booking(
        &booking,
        BookingCommand::CheckOut(on_site_reading()),
        provider_actor(),
        now(),
        &PlatformSettings::default(),
    );
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidBookingState {
            operation: "check out",
            status: BookingStatus::Accepted,
        }))
    );
}

#[test]
fn test_system_actor_cannot_check_in() {
    let booking: Booking = create_test_booking(BookingStatus::Accepted);
    let result = apply_booking(
        &booking,
        BookingCommand::CheckIn(on_site_reading()),
        Actor::System,
        now(),
        &PlatformSettings::default(),
    );
    assert_eq!(
        result,
        Err(CoreError::UserActorRequired {
            operation: "check in"
        })
    );
}

#[test]
fn test_cancel_records_who_and_why() {
    let booking: Booking = create_test_booking(BookingStatus::Accepted);
    let transition: BookingTransition = apply_booking(
        &booking,
        BookingCommand::Cancel {
            reason: Some(String::from("Unwell")),
        },
        participant_actor(),
        now(),
        &PlatformSettings::default(),
    )
    .unwrap();

    assert_eq!(transition.booking.status, BookingStatus::Cancelled);
    assert_eq!(transition.booking.cancelled_at, Some(now()));
    assert_eq!(
        transition.booking.cancelled_by,
        participant_actor().user_id()
    );
    assert_eq!(
        transition.booking.cancellation_reason.as_deref(),
        Some("Unwell")
    );
}

#[test]
fn test_cancel_terminal_booking_rejected() {
    for status in [
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Declined,
    ] {
        let booking: Booking = create_test_booking(status);
        let result = apply_booking(
            &booking,
            BookingCommand::Cancel { reason: None },
            participant_actor(),
            now(),
            &PlatformSettings::default(),
        );
        assert_eq!(
            result,
            Err(CoreError::DomainViolation(DomainError::InvalidBookingState {
                operation: "cancel",
                status,
            }))
        );
    }
}

#[test]
fn test_transition_stamps_updated_at_but_not_version() {
    let booking: Booking = create_test_booking(BookingStatus::Pending);
    let transition: BookingTransition = apply_booking(
        &booking,
        BookingCommand::Accept,
        provider_actor(),
        now(),
        &PlatformSettings::default(),
    )
    .unwrap();

    assert_eq!(transition.booking.updated_at, now());
    assert_eq!(transition.booking.version, booking.version);
    assert!(transition.changed);
}
