// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scheduled times, durations, and rate selection.

use crate::error::DomainError;
use crate::money::{round_hours, round_money};
use rust_decimal::Decimal;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, Time};

const TIME_OF_DAY: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

const SECONDS_PER_HOUR: i64 = 3600;

/// Parses a zero-padded 24-hour `HH:MM` time of day.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimeOfDay` if the value is malformed.
pub fn parse_time_of_day(value: &str) -> Result<Time, DomainError> {
    Time::parse(value, TIME_OF_DAY).map_err(|e| DomainError::InvalidTimeOfDay {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Computes `end - start` in hours for a same-day booking.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimeOfDay` if either time is malformed, or
/// `DomainError::NonPositiveDuration` if end is not after start.
pub fn scheduled_duration_hours(start: &str, end: &str) -> Result<Decimal, DomainError> {
    let start_time: Time = parse_time_of_day(start)?;
    let end_time: Time = parse_time_of_day(end)?;
    let minutes: i64 = (end_time - start_time).whole_minutes();
    if minutes <= 0 {
        return Err(DomainError::NonPositiveDuration {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(round_hours(Decimal::from(minutes) / Decimal::from(60)))
}

/// Hours elapsed between check-in and check-out.
///
/// A clock that runs backwards yields zero rather than a negative duration.
#[must_use]
pub fn elapsed_hours(started_at: OffsetDateTime, ended_at: OffsetDateTime) -> Decimal {
    let seconds: i64 = (ended_at - started_at).whole_seconds().max(0);
    round_hours(Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR))
}

/// Picks the quoted rate: weekday rate, then base rate, then zero.
#[must_use]
pub fn select_rate(weekday_rate: Option<Decimal>, base_rate: Option<Decimal>) -> Decimal {
    weekday_rate.or(base_rate).unwrap_or(Decimal::ZERO)
}

/// `rate x hours`, rounded to cents.
#[must_use]
pub fn estimated_total(rate: Decimal, hours: Decimal) -> Decimal {
    round_money(rate * hours)
}
