// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Actor, SYSTEM_ROLE, StatusChange};
use ndis_market_domain::{BookingStatus, Role};
use time::macros::datetime;

#[test]
fn test_user_actor_exposes_id_and_role() {
    let actor: Actor = Actor::user(42, Role::Provider);

    assert_eq!(actor.user_id(), Some(42));
    assert_eq!(actor.role_str(), "provider");
}

#[test]
fn test_system_actor_has_no_user() {
    let actor: Actor = Actor::System;

    assert_eq!(actor.user_id(), None);
    assert_eq!(actor.role_str(), SYSTEM_ROLE);
}

#[test]
fn test_actor_rebuilt_from_stored_parts() {
    assert_eq!(
        Actor::from_parts(Some(7), "participant"),
        Some(Actor::user(7, Role::Participant))
    );
    assert_eq!(Actor::from_parts(None, "system"), Some(Actor::System));
    assert_eq!(Actor::from_parts(None, "admin"), None);
    assert_eq!(Actor::from_parts(Some(7), "robot"), None);
}

#[test]
fn test_creation_record_has_no_from_status() {
    let change = StatusChange::created(
        BookingStatus::Pending,
        Actor::user(1, Role::Participant),
        datetime!(2026-03-01 10:00 UTC),
    );

    assert_eq!(change.from, None);
    assert_eq!(change.to, BookingStatus::Pending);
    assert_eq!(change.reason, None);
}

#[test]
fn test_transition_record_carries_reason() {
    let change = StatusChange::new(
        BookingStatus::Pending,
        BookingStatus::Declined,
        Actor::user(2, Role::Provider),
        Some(String::from("Fully booked")),
        datetime!(2026-03-01 11:00 UTC),
    );

    assert_eq!(change.from, Some(BookingStatus::Pending));
    assert_eq!(change.to, BookingStatus::Declined);
    assert_eq!(change.reason.as_deref(), Some("Fully booked"));
}
