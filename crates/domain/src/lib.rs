// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking;
mod booking_status;
mod directory;
mod error;
mod geofence;
mod invoice;
mod invoice_status;
mod money;
mod numbering;
mod payment;
mod schedule;
mod settings;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use booking::{Booking, CheckInRecord, NewBooking};
pub use booking_status::BookingStatus;
pub use directory::{ParticipantProfile, ProviderProfile, ProviderService, User};
pub use error::DomainError;
pub use geofence::{
    EARTH_RADIUS_METERS, GeofenceCheck, evaluate_geofence, haversine_distance_meters,
};
pub use invoice::{
    Invoice, InvoiceLineItem, InvoiceTotals, LineItemInput, NewInvoice, PricedLineItem,
    compute_invoice_totals, price_line_items,
};
pub use invoice_status::{InvoiceStatus, PaymentStatus, PayoutStatus};
pub use money::{ensure_non_negative, parse_money, round_hours, round_money};
pub use numbering::{
    format_booking_number, format_invoice_number, generate_booking_number, year_month,
};
pub use payment::{
    Payment, ProviderPayout, RefundOutcome, payout_amount, plan_refund, settlement_status,
};
pub use schedule::{
    elapsed_hours, estimated_total, parse_time_of_day, scheduled_duration_hours, select_rate,
};
pub use settings::{DEFAULT_GEOFENCE_RADIUS_METERS, PlatformSettings};
pub use types::{Address, BillToType, CheckType, Coordinates, RateType, Role, UserStatus};
pub use validation::{validate_business_name, validate_service_offering, validate_user_fields};
