// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking_status::BookingStatus;
use crate::types::{Address, CheckType, Coordinates, RateType, Role};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

/// A booking as stored, including every lifecycle field.
///
/// `version` is the optimistic-concurrency counter. It increases by one on
/// every persisted transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub booking_number: String,
    pub participant_id: i64,
    pub provider_id: i64,
    pub provider_service_id: i64,
    pub created_by_user_id: i64,
    pub created_by_role: Role,
    pub service_type: String,
    pub scheduled_date: Date,
    pub scheduled_start_time: String,
    pub scheduled_end_time: String,
    pub scheduled_duration_hours: Decimal,
    pub address: Address,
    pub service_location: Option<Coordinates>,
    pub notes: Option<String>,
    pub quoted_rate: Decimal,
    pub rate_type: RateType,
    pub estimated_total: Decimal,
    pub status: BookingStatus,
    pub provider_response_deadline: OffsetDateTime,
    pub provider_response_at: Option<OffsetDateTime>,
    pub decline_reason: Option<String>,
    pub actual_start_time: Option<OffsetDateTime>,
    pub actual_end_time: Option<OffsetDateTime>,
    pub actual_duration_hours: Option<Decimal>,
    pub confirmation_deadline: Option<OffsetDateTime>,
    pub provider_confirmed_at: Option<OffsetDateTime>,
    pub provider_confirmed_by: Option<i64>,
    pub participant_confirmed_at: Option<OffsetDateTime>,
    pub participant_confirmed_by: Option<i64>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub cancelled_by: Option<i64>,
    pub cancellation_reason: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub version: i64,
}

impl Booking {
    /// Returns true once both parties have confirmed delivery.
    #[must_use]
    pub const fn is_fully_confirmed(&self) -> bool {
        self.provider_confirmed_at.is_some() && self.participant_confirmed_at.is_some()
    }

    /// Hours to bill: actual if recorded, otherwise scheduled.
    #[must_use]
    pub fn billable_hours(&self) -> Decimal {
        self.actual_duration_hours
            .unwrap_or(self.scheduled_duration_hours)
    }
}

/// A booking that has been priced and numbered but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub booking_number: String,
    pub participant_id: i64,
    pub provider_id: i64,
    pub provider_service_id: i64,
    pub created_by_user_id: i64,
    pub created_by_role: Role,
    pub service_type: String,
    pub scheduled_date: Date,
    pub scheduled_start_time: String,
    pub scheduled_end_time: String,
    pub scheduled_duration_hours: Decimal,
    pub address: Address,
    pub service_location: Option<Coordinates>,
    pub notes: Option<String>,
    pub quoted_rate: Decimal,
    pub rate_type: RateType,
    pub estimated_total: Decimal,
    pub provider_response_deadline: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

/// One GPS check-in or check-out event. Append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInRecord {
    /// `None` until persisted.
    pub id: Option<i64>,
    pub booking_id: i64,
    pub user_id: i64,
    pub check_type: CheckType,
    pub location: Coordinates,
    pub accuracy_meters: Option<f64>,
    pub is_within_geofence: Option<bool>,
    pub distance_from_service_location_meters: Option<f64>,
    pub photo_url: Option<String>,
    pub recorded_at: OffsetDateTime,
}
