// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.
//!
//! Transitions are applied with a conditional update on `version`. A
//! writer holding a stale copy of the booking updates zero rows and gets
//! `PersistenceError::ConcurrentModification` instead of overwriting.

use diesel::prelude::*;
use diesel::SqliteConnection;
use ndis_market::{BookingDraft, BookingTransition};
use ndis_market_audit::StatusChange;
use ndis_market_domain::{Booking, BookingStatus, CheckInRecord};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{BookingChanges, NewBookingRow, format_timestamp};
use crate::diesel_schema::{booking_check_ins, booking_status_history, bookings};
use crate::error::PersistenceError;
use crate::queries::bookings::{booking_exists, get_booking};

/// Inserts a new booking and its creation history row.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the booking number is
/// already taken. Nothing is written in that case.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    draft: &BookingDraft,
) -> Result<Booking, PersistenceError> {
    let row: NewBookingRow = NewBookingRow::from_new(&draft.booking, draft.status_change.to)?;

    let booking_id: i64 = conn.transaction::<i64, PersistenceError, _>(|conn| {
        diesel::insert_into(bookings::table)
            .values(&row)
            .execute(conn)?;
        let booking_id: i64 = conn.get_last_insert_rowid()?;
        insert_booking_history(conn, booking_id, &draft.status_change)?;
        Ok(booking_id)
    })?;

    info!(
        booking_id,
        booking_number = %draft.booking.booking_number,
        "Created booking"
    );

    get_booking(conn, booking_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("booking {booking_id}")))
}

/// Writes a booking transition.
///
/// The booking row, the optional GPS record, and the optional history row
/// are written in one transaction. The stored version becomes
/// `expected_version + 1`. Unchanged transitions are not written.
///
/// # Errors
///
/// Returns `PersistenceError::ConcurrentModification` if the stored
/// version is not `expected_version`, or `PersistenceError::NotFound` if
/// the booking no longer exists.
pub fn persist_booking_transition(
    conn: &mut SqliteConnection,
    expected_version: i64,
    transition: &BookingTransition,
) -> Result<Booking, PersistenceError> {
    let booking: &Booking = &transition.booking;
    if !transition.changed {
        debug!(booking_id = booking.id, "Booking unchanged; nothing to write");
        return Ok(booking.clone());
    }

    let next_version: i64 = expected_version + 1;
    let changes: BookingChanges = BookingChanges::from_booking(booking, next_version)?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            bookings::table
                .filter(bookings::id.eq(booking.id))
                .filter(bookings::version.eq(expected_version)),
        )
        .set(&changes)
        .execute(conn)?;

        if updated == 0 {
            return Err(if booking_exists(conn, booking.id)? {
                PersistenceError::ConcurrentModification {
                    entity: "booking",
                    id: booking.id,
                }
            } else {
                PersistenceError::NotFound(format!("booking {}", booking.id))
            });
        }

        if let Some(check_in) = &transition.check_in {
            insert_check_in(conn, check_in)?;
        }
        if let Some(change) = &transition.status_change {
            insert_booking_history(conn, booking.id, change)?;
        }
        Ok(())
    })?;

    info!(
        booking_id = booking.id,
        status = %booking.status,
        version = next_version,
        "Persisted booking transition"
    );

    let mut stored: Booking = booking.clone();
    stored.version = next_version;
    Ok(stored)
}

fn insert_booking_history(
    conn: &mut SqliteConnection,
    booking_id: i64,
    change: &StatusChange<BookingStatus>,
) -> Result<(), PersistenceError> {
    diesel::insert_into(booking_status_history::table)
        .values((
            booking_status_history::booking_id.eq(booking_id),
            booking_status_history::from_status.eq(change.from.map(|s| s.as_str())),
            booking_status_history::to_status.eq(change.to.as_str()),
            booking_status_history::changed_by.eq(change.actor.user_id()),
            booking_status_history::changed_by_role.eq(change.actor.role_str()),
            booking_status_history::reason.eq(&change.reason),
            booking_status_history::created_at.eq(format_timestamp(change.at)?),
        ))
        .execute(conn)?;
    Ok(())
}

fn insert_check_in(
    conn: &mut SqliteConnection,
    record: &CheckInRecord,
) -> Result<(), PersistenceError> {
    diesel::insert_into(booking_check_ins::table)
        .values((
            booking_check_ins::booking_id.eq(record.booking_id),
            booking_check_ins::user_id.eq(record.user_id),
            booking_check_ins::check_type.eq(record.check_type.as_str()),
            booking_check_ins::latitude.eq(record.location.latitude()),
            booking_check_ins::longitude.eq(record.location.longitude()),
            booking_check_ins::accuracy_meters.eq(record.accuracy_meters),
            booking_check_ins::is_within_geofence.eq(record.is_within_geofence),
            booking_check_ins::distance_from_service_location_meters
                .eq(record.distance_from_service_location_meters),
            booking_check_ins::photo_url.eq(&record.photo_url),
            booking_check_ins::created_at.eq(format_timestamp(record.recorded_at)?),
        ))
        .execute(conn)?;
    Ok(())
}
