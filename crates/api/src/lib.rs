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
#![allow(clippy::multiple_crate_versions)]

//! Service layer for the marketplace.
//!
//! Each operation authenticates nothing itself: callers resolve an
//! [`AuthenticatedActor`] first, then pass it in with the store and the
//! [`ServiceContext`]. Errors leave this crate as [`ApiError`] only.

mod auth;
mod bookings;
mod context;
mod directory;
mod error;
mod gateway;
mod invoices;
mod notifications;
mod payments;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use bookings::{
    BOOKING_NUMBER_ATTEMPTS, accept_booking, booking_history, cancel_booking, check_in,
    confirm_booking, create_booking, decline_booking, get_booking, list_bookings, list_check_ins,
};
pub use context::{Clock, FixedClock, ServiceContext, SystemClock};
pub use directory::{
    add_provider_service, bootstrap_admin, create_participant_profile, create_provider_profile,
    list_provider_services, register_user, set_user_status,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use gateway::{
    GATEWAY_SECRET_ENV, GatewayConfig, GatewayError, GatewayRefund, LivePaymentGateway,
    MockPaymentGateway, PaymentGateway, PaymentIntent, Transfer,
};
pub use invoices::{
    INVOICE_NUMBER_ATTEMPTS, cancel_invoice, create_invoice, create_invoice_from_booking,
    get_invoice, invoice_history, list_invoices, mark_invoice_paid, mark_overdue, send_invoice,
    view_invoice,
};
pub use notifications::{
    ChannelKind, DeliveryReceipt, EmailMessage, MarketEvent, NoopChannel, NotificationChannel,
    NotificationDispatcher, NotificationError, Recipient, RecordingChannel, SentNotification,
    SmsMessage,
};
pub use payments::{
    confirm_payment, create_payment_intent, create_payout, list_payments, list_payouts,
    refund_payment,
};
pub use request_response::{
    AddProviderServiceRequest, BookingNames, BookingSummary, CheckInInfo, CheckInRequest,
    ConfirmPaymentResponse, CreateBookingRequest, CreateInvoiceRequest,
    CreateParticipantProfileRequest, CreatePayoutRequest, CreatePayoutResponse,
    CreateProviderProfileRequest, InvoiceDetail, InvoiceFromBookingRequest, InvoiceInfo,
    LineItemInfo, LineItemRequest, ListBookingsQuery, ListInvoicesQuery, OverdueSweepResponse,
    ParticipantInfo, PaymentInfo, PaymentIntentResponse, PayoutInfo, ProviderInfo,
    ProviderServiceInfo, ReasonRequest, RefundRequest, RefundResponse, RegisterUserRequest,
    SetUserStatusRequest, StatusHistoryInfo, UserInfo, format_timestamp, parse_date,
};
