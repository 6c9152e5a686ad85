// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end walks through the booking state graph.

use crate::tests::helpers::{
    create_test_booking, create_test_service, now, on_site_reading, participant_actor,
    provider_actor,
};
use crate::{BookingCommand, BookingTransition, apply_booking, line_item_from_booking};
use ndis_market_audit::Actor;
use ndis_market_domain::{Booking, BookingStatus, PlatformSettings};
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

fn step(
    booking: &Booking,
    command: BookingCommand,
    actor: Actor,
    at: OffsetDateTime,
) -> BookingTransition {
    apply_booking(booking, command, actor, at, &PlatformSettings::default()).unwrap()
}

#[test]
fn test_happy_path_to_completion() {
    let mut history: Vec<(Option<BookingStatus>, BookingStatus)> = Vec::new();
    let mut booking: Booking = create_test_booking(BookingStatus::Pending);
    let start: OffsetDateTime = now();

    let plan: Vec<(BookingCommand, Actor, OffsetDateTime)> = vec![
        (BookingCommand::Accept, provider_actor(), start),
        (
            BookingCommand::CheckIn(on_site_reading()),
            provider_actor(),
            start + Duration::hours(1),
        ),
        (
            BookingCommand::CheckOut(on_site_reading()),
            provider_actor(),
            start + Duration::hours(4),
        ),
        (
            BookingCommand::ConfirmAsParticipant,
            participant_actor(),
            start + Duration::hours(5),
        ),
        (
            BookingCommand::ConfirmAsProvider,
            provider_actor(),
            start + Duration::hours(6),
        ),
    ];

    for (command, actor, at) in plan {
        let transition: BookingTransition = step(&booking, command, actor, at);
        if let Some(change) = &transition.status_change {
            history.push((change.from, change.to));
        }
        booking = transition.booking;
    }

    assert_eq!(booking.status, BookingStatus::Completed);
    assert_eq!(booking.actual_duration_hours, Some(Decimal::from(3)));
    assert_eq!(
        history,
        vec![
            (Some(BookingStatus::Pending), BookingStatus::Accepted),
            (Some(BookingStatus::Accepted), BookingStatus::InProgress),
            (
                Some(BookingStatus::InProgress),
                BookingStatus::PendingConfirmation
            ),
            (
                Some(BookingStatus::PendingConfirmation),
                BookingStatus::Completed
            ),
        ]
    );

    let item = line_item_from_booking(&booking, &create_test_service()).unwrap();
    assert_eq!(item.quantity, Decimal::from(3));
}

#[test]
fn test_every_status_change_follows_the_table() {
    let mut booking: Booking = create_test_booking(BookingStatus::Pending);
    let commands: Vec<(BookingCommand, Actor)> = vec![
        (BookingCommand::Accept, provider_actor()),
        (BookingCommand::CheckIn(on_site_reading()), provider_actor()),
        (BookingCommand::CheckIn(on_site_reading()), provider_actor()),
        (BookingCommand::Cancel { reason: None }, participant_actor()),
    ];
    for (command, actor) in commands {
        let transition = step(&booking, command, actor, now());
        let change = transition.status_change.clone().unwrap();
        assert!(change.from.unwrap().can_transition_to(change.to));
        booking = transition.booking;
    }
    assert_eq!(booking.status, BookingStatus::Cancelled);
    assert!(booking.status.is_terminal());
}

#[test]
fn test_completed_only_with_both_confirmations() {
    let booking: Booking = create_test_booking(BookingStatus::PendingConfirmation);
    let one = step(
        &booking,
        BookingCommand::ConfirmAsProvider,
        provider_actor(),
        now(),
    );
    assert_ne!(one.booking.status, BookingStatus::Completed);

    let both = step(
        &one.booking,
        BookingCommand::ConfirmAsParticipant,
        participant_actor(),
        now(),
    );
    assert_eq!(both.booking.status, BookingStatus::Completed);
    assert!(both.booking.provider_confirmed_at.is_some());
    assert!(both.booking.participant_confirmed_at.is_some());
}
