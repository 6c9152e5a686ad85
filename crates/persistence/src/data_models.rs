// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and the codecs that map them to domain values.
//!
//! Money and hours are stored as decimal TEXT, timestamps as RFC 3339 TEXT
//! and dates as `YYYY-MM-DD` TEXT. Every row read back is validated when it
//! is converted, so a corrupt column surfaces as
//! `PersistenceError::ReconstructionError` rather than a panic.

use std::str::FromStr;

use diesel::prelude::*;
use ndis_market_audit::{Actor, StatusChange, StatusHistoryEntry};
use ndis_market_domain::{
    Address, BillToType, Booking, BookingStatus, CheckInRecord, CheckType, Coordinates,
    DomainError, Invoice, InvoiceLineItem, InvoiceStatus, InvoiceTotals, NewBooking, NewInvoice,
    ParticipantProfile, Payment, PaymentStatus, PayoutStatus, PricedLineItem, ProviderPayout,
    ProviderProfile, ProviderService, RateType, Role, User, UserStatus,
};
use rust_decimal::Decimal;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::diesel_schema::{
    booking_check_ins, booking_status_history, bookings, invoice_line_items,
    invoice_status_history, invoices, participants, payments, provider_payouts,
    provider_services, providers, users,
};
use crate::error::PersistenceError;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

// ============================================================================
// Codecs
// ============================================================================

pub(crate) fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(format!("timestamp: {e}")))
}

fn format_optional_timestamp(
    value: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    value.map(format_timestamp).transpose()
}

pub(crate) fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| PersistenceError::ReconstructionError(format!("timestamp '{value}': {e}")))
}

fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(parse_timestamp).transpose()
}

pub(crate) fn format_date(value: Date) -> Result<String, PersistenceError> {
    value
        .format(DATE_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("date: {e}")))
}

pub(crate) fn parse_date(value: &str) -> Result<Date, PersistenceError> {
    Date::parse(value, DATE_FORMAT)
        .map_err(|e| PersistenceError::ReconstructionError(format!("date '{value}': {e}")))
}

pub(crate) fn parse_decimal(value: &str) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(value)
        .map_err(|e| PersistenceError::ReconstructionError(format!("decimal '{value}': {e}")))
}

fn parse_optional_decimal(value: Option<&str>) -> Result<Option<Decimal>, PersistenceError> {
    value.map(parse_decimal).transpose()
}

fn parse_enum<T>(value: &str) -> Result<T, PersistenceError>
where
    T: FromStr<Err = DomainError>,
{
    value
        .parse()
        .map_err(|e: DomainError| PersistenceError::ReconstructionError(e.to_string()))
}

fn coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinates>, PersistenceError> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
            .map(Some)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string())),
        _ => Ok(None),
    }
}

fn line_number_from_row(value: i32) -> Result<u32, PersistenceError> {
    u32::try_from(value)
        .map_err(|_| PersistenceError::ReconstructionError(format!("line number {value}")))
}

pub(crate) fn line_number_to_row(value: u32) -> Result<i32, PersistenceError> {
    i32::try_from(value)
        .map_err(|_| PersistenceError::SerializationError(format!("line number {value}")))
}

fn actor_from_row(changed_by: Option<i64>, role: &str) -> Result<Actor, PersistenceError> {
    Actor::from_parts(changed_by, role).ok_or_else(|| {
        PersistenceError::ReconstructionError(format!(
            "history actor ({changed_by:?}, '{role}')"
        ))
    })
}

// ============================================================================
// Directory
// ============================================================================

/// Input for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: OffsetDateTime,
}

/// Input for creating a participant profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipantProfile {
    pub user_id: i64,
    pub ndis_number: Option<String>,
    pub plan_manager_id: Option<String>,
    pub bill_to_type: BillToType,
}

/// Input for creating a provider profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProviderProfile {
    pub user_id: i64,
    pub business_name: String,
    pub abn: Option<String>,
    pub gst_registered: bool,
}

/// Input for adding a service to a provider's catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProviderService {
    pub provider_id: i64,
    pub service_type: String,
    pub name: String,
    pub ndis_item_number: Option<String>,
    pub base_rate: Option<Decimal>,
    pub weekday_rate: Option<Decimal>,
    pub rate_type: RateType,
    pub unit: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct UserRow {
    id: i64,
    email: String,
    display_name: String,
    phone: Option<String>,
    role: String,
    status: String,
    created_at: String,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, PersistenceError> {
        Ok(User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            phone: self.phone,
            role: parse_enum(&self.role)?,
            status: parse_enum(&self.status)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = participants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ParticipantRow {
    id: i64,
    user_id: i64,
    ndis_number: Option<String>,
    plan_manager_id: Option<String>,
    bill_to_type: String,
}

impl ParticipantRow {
    pub(crate) fn into_domain(self) -> Result<ParticipantProfile, PersistenceError> {
        Ok(ParticipantProfile {
            id: self.id,
            user_id: self.user_id,
            ndis_number: self.ndis_number,
            plan_manager_id: self.plan_manager_id,
            bill_to_type: parse_enum(&self.bill_to_type)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = providers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ProviderRow {
    id: i64,
    user_id: i64,
    business_name: String,
    abn: Option<String>,
    gst_registered: bool,
}

impl ProviderRow {
    pub(crate) fn into_domain(self) -> ProviderProfile {
        ProviderProfile {
            id: self.id,
            user_id: self.user_id,
            business_name: self.business_name,
            abn: self.abn,
            gst_registered: self.gst_registered,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = provider_services)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ProviderServiceRow {
    id: i64,
    provider_id: i64,
    service_type: String,
    name: String,
    ndis_item_number: Option<String>,
    base_rate: Option<String>,
    weekday_rate: Option<String>,
    rate_type: String,
    unit: String,
}

impl ProviderServiceRow {
    pub(crate) fn into_domain(self) -> Result<ProviderService, PersistenceError> {
        Ok(ProviderService {
            id: self.id,
            provider_id: self.provider_id,
            service_type: self.service_type,
            name: self.name,
            ndis_item_number: self.ndis_item_number,
            base_rate: parse_optional_decimal(self.base_rate.as_deref())?,
            weekday_rate: parse_optional_decimal(self.weekday_rate.as_deref())?,
            rate_type: parse_enum(&self.rate_type)?,
            unit: self.unit,
        })
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Narrows a booking listing.
///
/// Every `Some` field is an additional `AND` condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub participant_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub status: Option<BookingStatus>,
    pub from_date: Option<Date>,
    pub to_date: Option<Date>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct BookingRow {
    id: i64,
    booking_number: String,
    participant_id: i64,
    provider_id: i64,
    provider_service_id: i64,
    created_by_user_id: i64,
    created_by_role: String,
    service_type: String,
    scheduled_date: String,
    scheduled_start_time: String,
    scheduled_end_time: String,
    scheduled_duration_hours: String,
    address_line1: String,
    address_line2: Option<String>,
    suburb: String,
    state: String,
    postcode: String,
    service_latitude: Option<f64>,
    service_longitude: Option<f64>,
    notes: Option<String>,
    quoted_rate: String,
    rate_type: String,
    estimated_total: String,
    status: String,
    provider_response_deadline: String,
    provider_response_at: Option<String>,
    decline_reason: Option<String>,
    actual_start_time: Option<String>,
    actual_end_time: Option<String>,
    actual_duration_hours: Option<String>,
    confirmation_deadline: Option<String>,
    provider_confirmed_at: Option<String>,
    provider_confirmed_by: Option<i64>,
    participant_confirmed_at: Option<String>,
    participant_confirmed_by: Option<i64>,
    cancelled_at: Option<String>,
    cancelled_by: Option<i64>,
    cancellation_reason: Option<String>,
    created_at: String,
    updated_at: String,
    version: i64,
}

impl BookingRow {
    pub(crate) fn into_domain(self) -> Result<Booking, PersistenceError> {
        Ok(Booking {
            id: self.id,
            booking_number: self.booking_number,
            participant_id: self.participant_id,
            provider_id: self.provider_id,
            provider_service_id: self.provider_service_id,
            created_by_user_id: self.created_by_user_id,
            created_by_role: parse_enum(&self.created_by_role)?,
            service_type: self.service_type,
            scheduled_date: parse_date(&self.scheduled_date)?,
            scheduled_start_time: self.scheduled_start_time,
            scheduled_end_time: self.scheduled_end_time,
            scheduled_duration_hours: parse_decimal(&self.scheduled_duration_hours)?,
            address: Address {
                line1: self.address_line1,
                line2: self.address_line2,
                suburb: self.suburb,
                state: self.state,
                postcode: self.postcode,
            },
            service_location: coordinates(self.service_latitude, self.service_longitude)?,
            notes: self.notes,
            quoted_rate: parse_decimal(&self.quoted_rate)?,
            rate_type: parse_enum(&self.rate_type)?,
            estimated_total: parse_decimal(&self.estimated_total)?,
            status: parse_enum(&self.status)?,
            provider_response_deadline: parse_timestamp(&self.provider_response_deadline)?,
            provider_response_at: parse_optional_timestamp(self.provider_response_at.as_deref())?,
            decline_reason: self.decline_reason,
            actual_start_time: parse_optional_timestamp(self.actual_start_time.as_deref())?,
            actual_end_time: parse_optional_timestamp(self.actual_end_time.as_deref())?,
            actual_duration_hours: parse_optional_decimal(self.actual_duration_hours.as_deref())?,
            confirmation_deadline: parse_optional_timestamp(
                self.confirmation_deadline.as_deref(),
            )?,
            provider_confirmed_at: parse_optional_timestamp(
                self.provider_confirmed_at.as_deref(),
            )?,
            provider_confirmed_by: self.provider_confirmed_by,
            participant_confirmed_at: parse_optional_timestamp(
                self.participant_confirmed_at.as_deref(),
            )?,
            participant_confirmed_by: self.participant_confirmed_by,
            cancelled_at: parse_optional_timestamp(self.cancelled_at.as_deref())?,
            cancelled_by: self.cancelled_by,
            cancellation_reason: self.cancellation_reason,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            version: self.version,
        })
    }
}

/// Insert shape of a new booking row.
#[derive(Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBookingRow {
    pub booking_number: String,
    pub participant_id: i64,
    pub provider_id: i64,
    pub provider_service_id: i64,
    pub created_by_user_id: i64,
    pub created_by_role: String,
    pub service_type: String,
    pub scheduled_date: String,
    pub scheduled_start_time: String,
    pub scheduled_end_time: String,
    pub scheduled_duration_hours: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub suburb: String,
    pub state: String,
    pub postcode: String,
    pub service_latitude: Option<f64>,
    pub service_longitude: Option<f64>,
    pub notes: Option<String>,
    pub quoted_rate: String,
    pub rate_type: String,
    pub estimated_total: String,
    pub status: String,
    pub provider_response_deadline: String,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
}

impl NewBookingRow {
    pub(crate) fn from_new(
        booking: &NewBooking,
        status: BookingStatus,
    ) -> Result<Self, PersistenceError> {
        let created_at: String = format_timestamp(booking.created_at)?;
        Ok(Self {
            booking_number: booking.booking_number.clone(),
            participant_id: booking.participant_id,
            provider_id: booking.provider_id,
            provider_service_id: booking.provider_service_id,
            created_by_user_id: booking.created_by_user_id,
            created_by_role: booking.created_by_role.as_str().to_string(),
            service_type: booking.service_type.clone(),
            scheduled_date: format_date(booking.scheduled_date)?,
            scheduled_start_time: booking.scheduled_start_time.clone(),
            scheduled_end_time: booking.scheduled_end_time.clone(),
            scheduled_duration_hours: booking.scheduled_duration_hours.to_string(),
            address_line1: booking.address.line1.clone(),
            address_line2: booking.address.line2.clone(),
            suburb: booking.address.suburb.clone(),
            state: booking.address.state.clone(),
            postcode: booking.address.postcode.clone(),
            service_latitude: booking.service_location.map(|c| c.latitude()),
            service_longitude: booking.service_location.map(|c| c.longitude()),
            notes: booking.notes.clone(),
            quoted_rate: booking.quoted_rate.to_string(),
            rate_type: booking.rate_type.as_str().to_string(),
            estimated_total: booking.estimated_total.to_string(),
            status: status.as_str().to_string(),
            provider_response_deadline: format_timestamp(booking.provider_response_deadline)?,
            updated_at: created_at.clone(),
            created_at,
            version: 1,
        })
    }
}

/// The columns a booking transition may change.
#[derive(AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BookingChanges {
    pub status: String,
    pub provider_response_at: Option<String>,
    pub decline_reason: Option<String>,
    pub actual_start_time: Option<String>,
    pub actual_end_time: Option<String>,
    pub actual_duration_hours: Option<String>,
    pub confirmation_deadline: Option<String>,
    pub provider_confirmed_at: Option<String>,
    pub provider_confirmed_by: Option<i64>,
    pub participant_confirmed_at: Option<String>,
    pub participant_confirmed_by: Option<i64>,
    pub cancelled_at: Option<String>,
    pub cancelled_by: Option<i64>,
    pub cancellation_reason: Option<String>,
    pub updated_at: String,
    pub version: i64,
}

impl BookingChanges {
    pub(crate) fn from_booking(
        booking: &Booking,
        next_version: i64,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            status: booking.status.as_str().to_string(),
            provider_response_at: format_optional_timestamp(booking.provider_response_at)?,
            decline_reason: booking.decline_reason.clone(),
            actual_start_time: format_optional_timestamp(booking.actual_start_time)?,
            actual_end_time: format_optional_timestamp(booking.actual_end_time)?,
            actual_duration_hours: booking.actual_duration_hours.map(|h| h.to_string()),
            confirmation_deadline: format_optional_timestamp(booking.confirmation_deadline)?,
            provider_confirmed_at: format_optional_timestamp(booking.provider_confirmed_at)?,
            provider_confirmed_by: booking.provider_confirmed_by,
            participant_confirmed_at: format_optional_timestamp(booking.participant_confirmed_at)?,
            participant_confirmed_by: booking.participant_confirmed_by,
            cancelled_at: format_optional_timestamp(booking.cancelled_at)?,
            cancelled_by: booking.cancelled_by,
            cancellation_reason: booking.cancellation_reason.clone(),
            updated_at: format_timestamp(booking.updated_at)?,
            version: next_version,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_check_ins)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct CheckInRow {
    id: i64,
    booking_id: i64,
    user_id: i64,
    check_type: String,
    latitude: f64,
    longitude: f64,
    accuracy_meters: Option<f64>,
    is_within_geofence: Option<bool>,
    distance_from_service_location_meters: Option<f64>,
    photo_url: Option<String>,
    created_at: String,
}

impl CheckInRow {
    pub(crate) fn into_domain(self) -> Result<CheckInRecord, PersistenceError> {
        let location: Coordinates = Coordinates::new(self.latitude, self.longitude)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        let check_type: CheckType = parse_enum(&self.check_type)?;
        Ok(CheckInRecord {
            id: Some(self.id),
            booking_id: self.booking_id,
            user_id: self.user_id,
            check_type,
            location,
            accuracy_meters: self.accuracy_meters,
            is_within_geofence: self.is_within_geofence,
            distance_from_service_location_meters: self.distance_from_service_location_meters,
            photo_url: self.photo_url,
            recorded_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_status_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct BookingHistoryRow {
    id: i64,
    booking_id: i64,
    from_status: Option<String>,
    to_status: String,
    changed_by: Option<i64>,
    changed_by_role: String,
    reason: Option<String>,
    created_at: String,
}

impl BookingHistoryRow {
    pub(crate) fn into_domain(
        self,
    ) -> Result<StatusHistoryEntry<BookingStatus>, PersistenceError> {
        let from: Option<BookingStatus> = self.from_status.as_deref().map(parse_enum).transpose()?;
        Ok(StatusHistoryEntry {
            id: self.id,
            subject_id: self.booking_id,
            change: StatusChange {
                from,
                to: parse_enum(&self.to_status)?,
                actor: actor_from_row(self.changed_by, &self.changed_by_role)?,
                reason: self.reason,
                at: parse_timestamp(&self.created_at)?,
            },
        })
    }
}

// ============================================================================
// Invoices
// ============================================================================

/// Narrows an invoice listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub provider_id: Option<i64>,
    pub participant_id: Option<i64>,
    pub status: Option<InvoiceStatus>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct InvoiceRow {
    id: i64,
    invoice_number: String,
    provider_id: i64,
    participant_id: i64,
    bill_to_type: String,
    plan_manager_id: Option<String>,
    subtotal: String,
    gst_amount: String,
    platform_fee: String,
    platform_fee_gst: String,
    total_amount: String,
    provider_payout: String,
    invoice_date: String,
    due_date: String,
    status: String,
    payout_status: String,
    sent_at: Option<String>,
    viewed_at: Option<String>,
    paid_at: Option<String>,
    cancelled_at: Option<String>,
    cancellation_reason: Option<String>,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl InvoiceRow {
    pub(crate) fn into_domain(self) -> Result<Invoice, PersistenceError> {
        let totals: InvoiceTotals = InvoiceTotals {
            subtotal: parse_decimal(&self.subtotal)?,
            gst_amount: parse_decimal(&self.gst_amount)?,
            platform_fee: parse_decimal(&self.platform_fee)?,
            platform_fee_gst: parse_decimal(&self.platform_fee_gst)?,
            total_amount: parse_decimal(&self.total_amount)?,
            provider_payout: parse_decimal(&self.provider_payout)?,
        };
        let status: InvoiceStatus = parse_enum(&self.status)?;
        let payout_status: PayoutStatus = parse_enum(&self.payout_status)?;
        let bill_to_type: BillToType = parse_enum(&self.bill_to_type)?;
        Ok(Invoice {
            id: self.id,
            invoice_number: self.invoice_number,
            provider_id: self.provider_id,
            participant_id: self.participant_id,
            bill_to_type,
            plan_manager_id: self.plan_manager_id,
            totals,
            invoice_date: parse_timestamp(&self.invoice_date)?,
            due_date: parse_date(&self.due_date)?,
            status,
            payout_status,
            sent_at: parse_optional_timestamp(self.sent_at.as_deref())?,
            viewed_at: parse_optional_timestamp(self.viewed_at.as_deref())?,
            paid_at: parse_optional_timestamp(self.paid_at.as_deref())?,
            cancelled_at: parse_optional_timestamp(self.cancelled_at.as_deref())?,
            cancellation_reason: self.cancellation_reason,
            notes: self.notes,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Insert shape of a new invoice row.
#[derive(Insertable)]
#[diesel(table_name = invoices)]
pub(crate) struct NewInvoiceRow {
    pub invoice_number: String,
    pub provider_id: i64,
    pub participant_id: i64,
    pub bill_to_type: String,
    pub plan_manager_id: Option<String>,
    pub subtotal: String,
    pub gst_amount: String,
    pub platform_fee: String,
    pub platform_fee_gst: String,
    pub total_amount: String,
    pub provider_payout: String,
    pub invoice_date: String,
    pub due_date: String,
    pub status: String,
    pub payout_status: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl NewInvoiceRow {
    pub(crate) fn from_new(
        invoice: &NewInvoice,
        status: InvoiceStatus,
    ) -> Result<Self, PersistenceError> {
        let invoice_date: String = format_timestamp(invoice.invoice_date)?;
        Ok(Self {
            invoice_number: invoice.invoice_number.clone(),
            provider_id: invoice.provider_id,
            participant_id: invoice.participant_id,
            bill_to_type: invoice.bill_to_type.as_str().to_string(),
            plan_manager_id: invoice.plan_manager_id.clone(),
            subtotal: invoice.totals.subtotal.to_string(),
            gst_amount: invoice.totals.gst_amount.to_string(),
            platform_fee: invoice.totals.platform_fee.to_string(),
            platform_fee_gst: invoice.totals.platform_fee_gst.to_string(),
            total_amount: invoice.totals.total_amount.to_string(),
            provider_payout: invoice.totals.provider_payout.to_string(),
            due_date: format_date(invoice.due_date)?,
            status: status.as_str().to_string(),
            payout_status: PayoutStatus::Pending.as_str().to_string(),
            notes: invoice.notes.clone(),
            created_at: invoice_date.clone(),
            updated_at: invoice_date.clone(),
            invoice_date,
        })
    }
}

/// The columns an invoice transition may change.
#[derive(AsChangeset)]
#[diesel(table_name = invoices)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct InvoiceChanges {
    pub status: String,
    pub sent_at: Option<String>,
    pub viewed_at: Option<String>,
    pub paid_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
    pub updated_at: String,
}

impl InvoiceChanges {
    pub(crate) fn from_invoice(invoice: &Invoice) -> Result<Self, PersistenceError> {
        Ok(Self {
            status: invoice.status.as_str().to_string(),
            sent_at: format_optional_timestamp(invoice.sent_at)?,
            viewed_at: format_optional_timestamp(invoice.viewed_at)?,
            paid_at: format_optional_timestamp(invoice.paid_at)?,
            cancelled_at: format_optional_timestamp(invoice.cancelled_at)?,
            cancellation_reason: invoice.cancellation_reason.clone(),
            updated_at: format_timestamp(invoice.updated_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = invoice_line_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct LineItemRow {
    id: i64,
    invoice_id: i64,
    line_number: i32,
    booking_id: Option<i64>,
    description: String,
    ndis_item_number: Option<String>,
    service_date: String,
    quantity: String,
    unit: String,
    unit_rate: String,
    line_total: String,
    gst_applicable: bool,
    gst_amount: String,
}

impl LineItemRow {
    pub(crate) fn into_domain(self) -> Result<InvoiceLineItem, PersistenceError> {
        Ok(InvoiceLineItem {
            id: self.id,
            invoice_id: self.invoice_id,
            line: PricedLineItem {
                line_number: line_number_from_row(self.line_number)?,
                booking_id: self.booking_id,
                description: self.description,
                ndis_item_number: self.ndis_item_number,
                service_date: parse_date(&self.service_date)?,
                quantity: parse_decimal(&self.quantity)?,
                unit: self.unit,
                unit_rate: parse_decimal(&self.unit_rate)?,
                line_total: parse_decimal(&self.line_total)?,
                gst_applicable: self.gst_applicable,
                gst_amount: parse_decimal(&self.gst_amount)?,
            },
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = invoice_status_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct InvoiceHistoryRow {
    id: i64,
    invoice_id: i64,
    from_status: Option<String>,
    to_status: String,
    changed_by: Option<i64>,
    changed_by_role: String,
    reason: Option<String>,
    created_at: String,
}

impl InvoiceHistoryRow {
    pub(crate) fn into_domain(
        self,
    ) -> Result<StatusHistoryEntry<InvoiceStatus>, PersistenceError> {
        let from: Option<InvoiceStatus> = self.from_status.as_deref().map(parse_enum).transpose()?;
        Ok(StatusHistoryEntry {
            id: self.id,
            subject_id: self.invoice_id,
            change: StatusChange {
                from,
                to: parse_enum(&self.to_status)?,
                actor: actor_from_row(self.changed_by, &self.changed_by_role)?,
                reason: self.reason,
                at: parse_timestamp(&self.created_at)?,
            },
        })
    }
}

// ============================================================================
// Payments & payouts
// ============================================================================

/// Input for recording a payment intent against an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub invoice_id: i64,
    pub amount: Decimal,
    pub payment_method: String,
    pub gateway_reference: String,
    pub created_at: OffsetDateTime,
}

/// A recorded refund against a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRecord {
    pub payment_id: i64,
    pub amount: Decimal,
    pub gateway_reference: String,
    pub created_at: OffsetDateTime,
}

/// An invoice eligible for the provider's next payout batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutCandidate {
    pub invoice_id: i64,
    pub provider_payout: Decimal,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct PaymentRow {
    id: i64,
    invoice_id: i64,
    amount: String,
    refunded_amount: String,
    status: String,
    payment_method: String,
    gateway_reference: String,
    created_at: String,
    completed_at: Option<String>,
}

impl PaymentRow {
    pub(crate) fn into_domain(self) -> Result<Payment, PersistenceError> {
        let status: PaymentStatus = parse_enum(&self.status)?;
        Ok(Payment {
            id: self.id,
            invoice_id: self.invoice_id,
            amount: parse_decimal(&self.amount)?,
            refunded_amount: parse_decimal(&self.refunded_amount)?,
            status,
            payment_method: self.payment_method,
            gateway_reference: self.gateway_reference,
            created_at: parse_timestamp(&self.created_at)?,
            completed_at: parse_optional_timestamp(self.completed_at.as_deref())?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = provider_payouts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct PayoutRow {
    id: i64,
    provider_id: i64,
    amount: String,
    transfer_reference: String,
    created_at: String,
}

impl PayoutRow {
    pub(crate) const fn id(&self) -> i64 {
        self.id
    }

    pub(crate) fn into_domain(
        self,
        invoice_ids: Vec<i64>,
    ) -> Result<ProviderPayout, PersistenceError> {
        Ok(ProviderPayout {
            id: self.id,
            provider_id: self.provider_id,
            amount: parse_decimal(&self.amount)?,
            invoice_ids,
            transfer_reference: self.transfer_reference,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
