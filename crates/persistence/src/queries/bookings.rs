// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use ndis_market_audit::StatusHistoryEntry;
use ndis_market_domain::{Booking, BookingStatus, CheckInRecord};
use tracing::debug;

use crate::data_models::{
    BookingFilter, BookingHistoryRow, BookingRow, CheckInRow, format_date,
};
use crate::diesel_schema::{booking_check_ins, booking_status_history, bookings};
use crate::error::PersistenceError;

/// Retrieves a booking by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Option<Booking>, PersistenceError> {
    debug!(booking_id, "Looking up booking");

    bookings::table
        .filter(bookings::id.eq(booking_id))
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?
        .map(BookingRow::into_domain)
        .transpose()
}

/// Lists bookings matching a filter, soonest scheduled first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_bookings(
    conn: &mut SqliteConnection,
    filter: &BookingFilter,
) -> Result<Vec<Booking>, PersistenceError> {
    let mut query = bookings::table.select(BookingRow::as_select()).into_boxed();

    if let Some(participant_id) = filter.participant_id {
        query = query.filter(bookings::participant_id.eq(participant_id));
    }
    if let Some(provider_id) = filter.provider_id {
        query = query.filter(bookings::provider_id.eq(provider_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(bookings::status.eq(status.as_str()));
    }
    // Dates are stored as YYYY-MM-DD, so text order is date order.
    if let Some(from_date) = filter.from_date {
        query = query.filter(bookings::scheduled_date.ge(format_date(from_date)?));
    }
    if let Some(to_date) = filter.to_date {
        query = query.filter(bookings::scheduled_date.le(format_date(to_date)?));
    }

    query
        .order((
            bookings::scheduled_date.asc(),
            bookings::scheduled_start_time.asc(),
            bookings::id.asc(),
        ))
        .load(conn)?
        .into_iter()
        .map(BookingRow::into_domain)
        .collect()
}

/// Returns a booking's status history, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn booking_history(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<StatusHistoryEntry<BookingStatus>>, PersistenceError> {
    booking_status_history::table
        .filter(booking_status_history::booking_id.eq(booking_id))
        .order(booking_status_history::id.asc())
        .select(BookingHistoryRow::as_select())
        .load(conn)?
        .into_iter()
        .map(BookingHistoryRow::into_domain)
        .collect()
}

/// Returns a booking's GPS check-in and check-out records, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_check_ins(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<CheckInRecord>, PersistenceError> {
    booking_check_ins::table
        .filter(booking_check_ins::booking_id.eq(booking_id))
        .order(booking_check_ins::id.asc())
        .select(CheckInRow::as_select())
        .load(conn)?
        .into_iter()
        .map(CheckInRow::into_domain)
        .collect()
}

/// Returns true if a booking row exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn booking_exists(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = bookings::table
        .filter(bookings::id.eq(booking_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
