// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Requests carry dates as `YYYY-MM-DD` strings and enumerations as their
//! snake-case names; both are parsed at the boundary before any rule runs.
//! Money travels as decimal strings.

use ndis_market_audit::StatusHistoryEntry;
use ndis_market_domain::{
    Address, BillToType, Booking, CheckInRecord, CheckType, Invoice, InvoiceLineItem,
    InvoiceStatus, ParticipantProfile, Payment, PaymentStatus, PayoutStatus, ProviderPayout,
    ProviderProfile, ProviderService, RateType, Role, User, UserStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::ApiError;

/// Formats a timestamp as RFC 3339.
#[must_use]
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

fn format_optional(at: Option<OffsetDateTime>) -> Option<String> {
    at.map(format_timestamp)
}

/// Parses a `YYYY-MM-DD` request field.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` naming the field if the value is malformed.
pub fn parse_date(field: &str, value: &str) -> Result<Date, ApiError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        ApiError::bad_request(
            "date_format",
            format!("Invalid {field} '{value}': expected YYYY-MM-DD ({e})"),
        )
    })
}

// ============================================================================
// Directory
// ============================================================================

/// Register a marketplace user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    /// `participant`, `provider`, `coordinator` or `admin`.
    pub role: String,
}

/// Change a user's account status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetUserStatusRequest {
    /// `active`, `pending` or `suspended`.
    pub status: String,
}

/// Create the participant profile for a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateParticipantProfileRequest {
    pub user_id: i64,
    pub ndis_number: Option<String>,
    pub plan_manager_id: Option<String>,
    /// Defaults to `self_managed`.
    pub bill_to_type: Option<String>,
}

/// Create the provider profile for a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateProviderProfileRequest {
    pub user_id: i64,
    pub business_name: String,
    pub abn: Option<String>,
    #[serde(default)]
    pub gst_registered: bool,
}

/// Add a service to a provider's catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddProviderServiceRequest {
    pub service_type: String,
    pub name: String,
    pub ndis_item_number: Option<String>,
    pub base_rate: Option<Decimal>,
    pub weekday_rate: Option<Decimal>,
    /// Defaults to `hourly`.
    pub rate_type: Option<String>,
    /// Defaults to `hour`.
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            phone: user.phone.clone(),
            role: user.role,
            status: user.status,
            created_at: format_timestamp(user.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantInfo {
    pub id: i64,
    pub user_id: i64,
    pub ndis_number: Option<String>,
    pub plan_manager_id: Option<String>,
    pub bill_to_type: BillToType,
}

impl From<&ParticipantProfile> for ParticipantInfo {
    fn from(profile: &ParticipantProfile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            ndis_number: profile.ndis_number.clone(),
            plan_manager_id: profile.plan_manager_id.clone(),
            bill_to_type: profile.bill_to_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub id: i64,
    pub user_id: i64,
    pub business_name: String,
    pub abn: Option<String>,
    pub gst_registered: bool,
}

impl From<&ProviderProfile> for ProviderInfo {
    fn from(profile: &ProviderProfile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            business_name: profile.business_name.clone(),
            abn: profile.abn.clone(),
            gst_registered: profile.gst_registered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderServiceInfo {
    pub id: i64,
    pub provider_id: i64,
    pub service_type: String,
    pub name: String,
    pub ndis_item_number: Option<String>,
    pub base_rate: Option<Decimal>,
    pub weekday_rate: Option<Decimal>,
    pub rate_type: RateType,
    pub unit: String,
}

impl From<&ProviderService> for ProviderServiceInfo {
    fn from(service: &ProviderService) -> Self {
        Self {
            id: service.id,
            provider_id: service.provider_id,
            service_type: service.service_type.clone(),
            name: service.name.clone(),
            ndis_item_number: service.ndis_item_number.clone(),
            base_rate: service.base_rate,
            weekday_rate: service.weekday_rate,
            rate_type: service.rate_type,
            unit: service.unit.clone(),
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Request a booking.
///
/// Participants book for themselves. Coordinators and admins must name the
/// participant they book for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateBookingRequest {
    pub participant_id: Option<i64>,
    pub provider_id: i64,
    pub provider_service_id: i64,
    pub service_type: String,
    /// `YYYY-MM-DD`.
    pub scheduled_date: String,
    /// `HH:MM`.
    pub scheduled_start_time: String,
    /// `HH:MM`.
    pub scheduled_end_time: String,
    pub address: Address,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

/// Optional reason for a decline or cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReasonRequest {
    pub reason: Option<String>,
}

/// A GPS check-in or check-out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckInRequest {
    /// `check_in` or `check_out`.
    pub check_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub photo_url: Option<String>,
}

/// Filters for listing bookings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ListBookingsQuery {
    pub status: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// A booking with the names of the parties and the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingSummary {
    pub id: i64,
    pub booking_number: String,
    pub status: String,
    pub participant_id: i64,
    pub participant_name: String,
    pub provider_id: i64,
    pub provider_name: String,
    pub provider_service_id: i64,
    pub service_name: String,
    pub service_type: String,
    pub scheduled_date: String,
    pub scheduled_start_time: String,
    pub scheduled_end_time: String,
    pub scheduled_duration_hours: Decimal,
    pub address: Address,
    pub service_latitude: Option<f64>,
    pub service_longitude: Option<f64>,
    pub notes: Option<String>,
    pub quoted_rate: Decimal,
    pub rate_type: RateType,
    pub estimated_total: Decimal,
    pub provider_response_deadline: String,
    pub provider_response_at: Option<String>,
    pub decline_reason: Option<String>,
    pub actual_start_time: Option<String>,
    pub actual_end_time: Option<String>,
    pub actual_duration_hours: Option<Decimal>,
    pub confirmation_deadline: Option<String>,
    pub provider_confirmed_at: Option<String>,
    pub participant_confirmed_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
    pub version: i64,
}

/// Display names attached to a booking summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingNames {
    pub participant_name: String,
    pub provider_name: String,
    pub service_name: String,
}

impl BookingSummary {
    #[must_use]
    pub fn new(booking: &Booking, names: BookingNames) -> Self {
        Self {
            id: booking.id,
            booking_number: booking.booking_number.clone(),
            status: booking.status.to_string(),
            participant_id: booking.participant_id,
            participant_name: names.participant_name,
            provider_id: booking.provider_id,
            provider_name: names.provider_name,
            provider_service_id: booking.provider_service_id,
            service_name: names.service_name,
            service_type: booking.service_type.clone(),
            scheduled_date: booking.scheduled_date.to_string(),
            scheduled_start_time: booking.scheduled_start_time.clone(),
            scheduled_end_time: booking.scheduled_end_time.clone(),
            scheduled_duration_hours: booking.scheduled_duration_hours,
            address: booking.address.clone(),
            service_latitude: booking.service_location.map(|c| c.latitude()),
            service_longitude: booking.service_location.map(|c| c.longitude()),
            notes: booking.notes.clone(),
            quoted_rate: booking.quoted_rate,
            rate_type: booking.rate_type,
            estimated_total: booking.estimated_total,
            provider_response_deadline: format_timestamp(booking.provider_response_deadline),
            provider_response_at: format_optional(booking.provider_response_at),
            decline_reason: booking.decline_reason.clone(),
            actual_start_time: format_optional(booking.actual_start_time),
            actual_end_time: format_optional(booking.actual_end_time),
            actual_duration_hours: booking.actual_duration_hours,
            confirmation_deadline: format_optional(booking.confirmation_deadline),
            provider_confirmed_at: format_optional(booking.provider_confirmed_at),
            participant_confirmed_at: format_optional(booking.participant_confirmed_at),
            cancelled_at: format_optional(booking.cancelled_at),
            cancellation_reason: booking.cancellation_reason.clone(),
            created_at: format_timestamp(booking.created_at),
            version: booking.version,
        }
    }
}

/// One row of a status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusHistoryInfo {
    pub id: i64,
    pub from_status: Option<String>,
    pub to_status: String,
    pub changed_by: Option<i64>,
    pub changed_by_role: String,
    pub reason: Option<String>,
    pub changed_at: String,
}

impl<S: Display> From<&StatusHistoryEntry<S>> for StatusHistoryInfo {
    fn from(entry: &StatusHistoryEntry<S>) -> Self {
        Self {
            id: entry.id,
            from_status: entry.change.from.as_ref().map(ToString::to_string),
            to_status: entry.change.to.to_string(),
            changed_by: entry.change.actor.user_id(),
            changed_by_role: String::from(entry.change.actor.role_str()),
            reason: entry.change.reason.clone(),
            changed_at: format_timestamp(entry.change.at),
        }
    }
}

/// One GPS event on a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInInfo {
    pub id: Option<i64>,
    pub booking_id: i64,
    pub user_id: i64,
    pub check_type: CheckType,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub is_within_geofence: Option<bool>,
    pub distance_from_service_location_meters: Option<f64>,
    pub photo_url: Option<String>,
    pub recorded_at: String,
}

impl From<&CheckInRecord> for CheckInInfo {
    fn from(record: &CheckInRecord) -> Self {
        Self {
            id: record.id,
            booking_id: record.booking_id,
            user_id: record.user_id,
            check_type: record.check_type,
            latitude: record.location.latitude(),
            longitude: record.location.longitude(),
            accuracy_meters: record.accuracy_meters,
            is_within_geofence: record.is_within_geofence,
            distance_from_service_location_meters: record.distance_from_service_location_meters,
            photo_url: record.photo_url.clone(),
            recorded_at: format_timestamp(record.recorded_at),
        }
    }
}

// ============================================================================
// Invoices
// ============================================================================

/// One line of a manually built invoice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineItemRequest {
    pub booking_id: Option<i64>,
    pub description: String,
    pub ndis_item_number: Option<String>,
    /// `YYYY-MM-DD`.
    pub service_date: String,
    pub quantity: Decimal,
    /// Defaults to `hour`.
    pub unit: Option<String>,
    pub unit_rate: Decimal,
    /// Defaults to the provider's GST registration.
    pub gst_applicable: Option<bool>,
}

/// Create an invoice from explicit line items.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateInvoiceRequest {
    pub provider_id: i64,
    pub participant_id: i64,
    pub line_items: Vec<LineItemRequest>,
    pub notes: Option<String>,
}

/// Optional notes for an invoice built from a booking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct InvoiceFromBookingRequest {
    pub notes: Option<String>,
}

/// Filters for listing invoices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ListInvoicesQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceInfo {
    pub id: i64,
    pub invoice_number: String,
    pub provider_id: i64,
    pub participant_id: i64,
    pub bill_to_type: BillToType,
    pub plan_manager_id: Option<String>,
    pub subtotal: Decimal,
    pub gst_amount: Decimal,
    pub platform_fee: Decimal,
    pub platform_fee_gst: Decimal,
    pub total_amount: Decimal,
    pub provider_payout: Decimal,
    pub invoice_date: String,
    pub due_date: String,
    pub status: InvoiceStatus,
    pub payout_status: PayoutStatus,
    pub sent_at: Option<String>,
    pub viewed_at: Option<String>,
    pub paid_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
}

impl From<&Invoice> for InvoiceInfo {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id,
            invoice_number: invoice.invoice_number.clone(),
            provider_id: invoice.provider_id,
            participant_id: invoice.participant_id,
            bill_to_type: invoice.bill_to_type,
            plan_manager_id: invoice.plan_manager_id.clone(),
            subtotal: invoice.totals.subtotal,
            gst_amount: invoice.totals.gst_amount,
            platform_fee: invoice.totals.platform_fee,
            platform_fee_gst: invoice.totals.platform_fee_gst,
            total_amount: invoice.totals.total_amount,
            provider_payout: invoice.totals.provider_payout,
            invoice_date: format_timestamp(invoice.invoice_date),
            due_date: invoice.due_date.to_string(),
            status: invoice.status,
            payout_status: invoice.payout_status,
            sent_at: format_optional(invoice.sent_at),
            viewed_at: format_optional(invoice.viewed_at),
            paid_at: format_optional(invoice.paid_at),
            cancelled_at: format_optional(invoice.cancelled_at),
            cancellation_reason: invoice.cancellation_reason.clone(),
            notes: invoice.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItemInfo {
    pub id: i64,
    pub line_number: u32,
    pub booking_id: Option<i64>,
    pub description: String,
    pub ndis_item_number: Option<String>,
    pub service_date: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_rate: Decimal,
    pub line_total: Decimal,
    pub gst_applicable: bool,
    pub gst_amount: Decimal,
}

impl From<&InvoiceLineItem> for LineItemInfo {
    fn from(item: &InvoiceLineItem) -> Self {
        Self {
            id: item.id,
            line_number: item.line.line_number,
            booking_id: item.line.booking_id,
            description: item.line.description.clone(),
            ndis_item_number: item.line.ndis_item_number.clone(),
            service_date: item.line.service_date.to_string(),
            quantity: item.line.quantity,
            unit: item.line.unit.clone(),
            unit_rate: item.line.unit_rate,
            line_total: item.line.line_total,
            gst_applicable: item.line.gst_applicable,
            gst_amount: item.line.gst_amount,
        }
    }
}

/// An invoice with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: InvoiceInfo,
    pub line_items: Vec<LineItemInfo>,
}

/// Result of the overdue sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueSweepResponse {
    pub marked_overdue: Vec<String>,
    pub count: usize,
}

// ============================================================================
// Payments & payouts
// ============================================================================

/// Refund all or part of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RefundRequest {
    /// Defaults to everything still refundable.
    pub amount: Option<Decimal>,
}

/// Batch a provider's paid invoices into a payout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatePayoutRequest {
    pub provider_id: i64,
    pub invoice_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntentResponse {
    pub payment_id: i64,
    pub intent_id: String,
    pub client_secret: String,
    pub amount: Decimal,
    pub mock_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentInfo {
    pub id: i64,
    pub invoice_id: i64,
    pub amount: Decimal,
    pub refunded_amount: Decimal,
    pub status: PaymentStatus,
    pub payment_method: String,
    pub gateway_reference: String,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<&Payment> for PaymentInfo {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            invoice_id: payment.invoice_id,
            amount: payment.amount,
            refunded_amount: payment.refunded_amount,
            status: payment.status,
            payment_method: payment.payment_method.clone(),
            gateway_reference: payment.gateway_reference.clone(),
            created_at: format_timestamp(payment.created_at),
            completed_at: format_optional(payment.completed_at),
        }
    }
}

/// A confirmed payment and the invoice status it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmPaymentResponse {
    pub payment: PaymentInfo,
    pub invoice_status: InvoiceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundResponse {
    pub payment: PaymentInfo,
    pub refund_id: String,
    pub refund_amount: Decimal,
    pub mock_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutInfo {
    pub id: i64,
    pub provider_id: i64,
    pub amount: Decimal,
    pub invoice_ids: Vec<i64>,
    pub transfer_reference: String,
    pub created_at: String,
}

impl From<&ProviderPayout> for PayoutInfo {
    fn from(payout: &ProviderPayout) -> Self {
        Self {
            id: payout.id,
            provider_id: payout.provider_id,
            amount: payout.amount,
            invoice_ids: payout.invoice_ids.clone(),
            transfer_reference: payout.transfer_reference.clone(),
            created_at: format_timestamp(payout.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePayoutResponse {
    pub payout: PayoutInfo,
    pub mock_mode: bool,
}
