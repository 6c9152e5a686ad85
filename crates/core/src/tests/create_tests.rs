// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    create_test_booking, create_test_participant, create_test_service, now, participant_actor,
    site,
};
use crate::{BookingDraft, BookingRequest, CoreError, draft_booking, line_item_from_booking};
use ndis_market_audit::Actor;
use ndis_market_domain::{
    Address, Booking, BookingStatus, DomainError, LineItemInput, PlatformSettings,
    ProviderService,
};
use rust_decimal::Decimal;
use time::Duration;
use time::macros::date;

fn request(start: &str, end: &str) -> BookingRequest {
    BookingRequest {
        provider_id: 2,
        provider_service_id: 3,
        service_type: String::from("personal_care"),
        scheduled_date: date!(2026 - 03 - 09),
        scheduled_start_time: start.to_string(),
        scheduled_end_time: end.to_string(),
        address: Address {
            line1: String::from("1 George St"),
            line2: None,
            suburb: String::from("Sydney"),
            state: String::from("NSW"),
            postcode: String::from("2000"),
        },
        service_location: Some(site()),
        notes: Some(String::from("Ring the bell")),
    }
}

fn draft(request: BookingRequest, service: &ProviderService) -> Result<BookingDraft, CoreError> {
    draft_booking(
        request,
        &create_test_participant(),
        service,
        participant_actor(),
        String::from("VC202603-1234"),
        now(),
        &PlatformSettings::default(),
    )
}

#[test]
fn test_three_hours_at_weekday_rate() {
    let result = draft(request("09:00", "12:00"), &create_test_service()).unwrap();

    assert_eq!(result.booking.scheduled_duration_hours, Decimal::from(3));
    assert_eq!(result.booking.quoted_rate, Decimal::from(55));
    assert_eq!(result.booking.estimated_total, Decimal::from(165));
    assert_eq!(result.booking.booking_number, "VC202603-1234");
}

#[test]
fn test_base_rate_used_without_weekday_rate() {
    let mut service: ProviderService = create_test_service();
    service.weekday_rate = None;
    let result = draft(request("09:00", "11:00"), &service).unwrap();
    assert_eq!(result.booking.quoted_rate, Decimal::from(50));
    assert_eq!(result.booking.estimated_total, Decimal::from(100));
}

#[test]
fn test_no_rates_quotes_zero() {
    let mut service: ProviderService = create_test_service();
    service.weekday_rate = None;
    service.base_rate = None;
    let result = draft(request("09:00", "11:00"), &service).unwrap();
    assert_eq!(result.booking.estimated_total, Decimal::ZERO);
}

#[test]
fn test_response_deadline_and_creation_history() {
    let result = draft(request("09:00", "12:00"), &create_test_service()).unwrap();

    assert_eq!(
        result.booking.provider_response_deadline,
        now() + Duration::hours(24)
    );
    assert_eq!(result.status_change.from, None);
    assert_eq!(result.status_change.to, BookingStatus::Pending);
    assert_eq!(result.status_change.actor, participant_actor());
}

#[test]
fn test_non_positive_duration_rejected() {
    let result = draft(request("12:00", "09:00"), &create_test_service());
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::NonPositiveDuration { .. }
        ))
    ));
}

#[test]
fn test_service_of_another_provider_rejected() {
    let mut service: ProviderService = create_test_service();
    service.provider_id = 99;
    let result = draft(request("09:00", "12:00"), &service);
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidField {
            field: "provider_service_id",
            ..
        }))
    ));
}

#[test]
fn test_system_cannot_create_bookings() {
    let result = draft_booking(
        request("09:00", "12:00"),
        &create_test_participant(),
        &create_test_service(),
        Actor::System,
        String::from("VC202603-1234"),
        now(),
        &PlatformSettings::default(),
    );
    assert!(matches!(result, Err(CoreError::UserActorRequired { .. })));
}

#[test]
fn test_line_item_prefers_actual_duration() {
    let mut booking: Booking = create_test_booking(BookingStatus::Completed);
    booking.actual_duration_hours = Some(Decimal::new(25, 1));

    let item: LineItemInput = line_item_from_booking(&booking, &create_test_service()).unwrap();

    assert_eq!(item.quantity, Decimal::new(25, 1));
    assert_eq!(item.unit_rate, Decimal::from(55));
    assert_eq!(item.booking_id, Some(booking.id));
    assert_eq!(item.description, "personal_care - Morning routine (2.5 hours)");
    assert_eq!(item.gst_applicable, None);
}

#[test]
fn test_line_item_falls_back_to_scheduled_duration() {
    let booking: Booking = create_test_booking(BookingStatus::Completed);
    let item: LineItemInput = line_item_from_booking(&booking, &create_test_service()).unwrap();
    assert_eq!(item.quantity, Decimal::from(3));
    assert_eq!(item.description, "personal_care - Morning routine (3 hours)");
}

#[test]
fn test_only_completed_bookings_are_invoiceable() {
    let booking: Booking = create_test_booking(BookingStatus::PendingConfirmation);
    let result = line_item_from_booking(&booking, &create_test_service());
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidBookingState {
            operation: "invoice",
            status: BookingStatus::PendingConfirmation,
        }))
    );
}
