// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP handlers.
//!
//! Handlers only extract, lock the store, call one service function and
//! wrap the result. All rules live in `ndis-market-api`.

use axum::{
    Json,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
};
use ndis_market_api::{
    AddProviderServiceRequest, BookingSummary, CheckInInfo, CheckInRequest,
    ConfirmPaymentResponse, CreateBookingRequest, CreateInvoiceRequest,
    CreateParticipantProfileRequest, CreatePayoutRequest, CreatePayoutResponse,
    CreateProviderProfileRequest, InvoiceDetail, InvoiceFromBookingRequest, InvoiceInfo,
    ListBookingsQuery, ListInvoicesQuery, OverdueSweepResponse, ParticipantInfo, PaymentInfo,
    PaymentIntentResponse, PayoutInfo, ProviderInfo, ProviderServiceInfo, ReasonRequest,
    RefundRequest, RefundResponse, RegisterUserRequest, SetUserStatusRequest, StatusHistoryInfo,
    UserInfo,
};
use serde::Serialize;
use tracing::info;

use crate::AppState;
use crate::error::HttpError;
use crate::identity::Identity;

type Created<T> = (StatusCode, Json<T>);

/// Response for GET `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mock_payments: bool,
}

pub async fn handle_health(AxumState(app_state): AxumState<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mock_payments: app_state.ctx.gateway.mock_mode(),
    })
}

// Directory

pub async fn handle_register_user(
    AxumState(app_state): AxumState<AppState>,
    identity: Option<Identity>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<Created<UserInfo>, HttpError> {
    info!(role = %req.role, "Handling register_user request");
    let actor = identity.map(|Identity(actor)| actor);
    let mut persistence = app_state.persistence.lock().await;
    let user: UserInfo =
        ndis_market_api::register_user(&mut persistence, &app_state.ctx, actor.as_ref(), req)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn handle_set_user_status(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(user_id): Path<i64>,
    Json(req): Json<SetUserStatusRequest>,
) -> Result<Json<UserInfo>, HttpError> {
    info!(user_id, status = %req.status, "Handling set_user_status request");
    let mut persistence = app_state.persistence.lock().await;
    let user: UserInfo = ndis_market_api::set_user_status(&mut persistence, &actor, user_id, &req)?;
    Ok(Json(user))
}

pub async fn handle_create_participant(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<CreateParticipantProfileRequest>,
) -> Result<Created<ParticipantInfo>, HttpError> {
    info!(user_id = req.user_id, "Handling create_participant request");
    let mut persistence = app_state.persistence.lock().await;
    let profile: ParticipantInfo =
        ndis_market_api::create_participant_profile(&mut persistence, &actor, req)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn handle_create_provider(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<CreateProviderProfileRequest>,
) -> Result<Created<ProviderInfo>, HttpError> {
    info!(user_id = req.user_id, "Handling create_provider request");
    let mut persistence = app_state.persistence.lock().await;
    let profile: ProviderInfo =
        ndis_market_api::create_provider_profile(&mut persistence, &actor, req)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn handle_add_provider_service(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(provider_id): Path<i64>,
    Json(req): Json<AddProviderServiceRequest>,
) -> Result<Created<ProviderServiceInfo>, HttpError> {
    info!(provider_id, "Handling add_provider_service request");
    let mut persistence = app_state.persistence.lock().await;
    let service: ProviderServiceInfo =
        ndis_market_api::add_provider_service(&mut persistence, &actor, provider_id, req)?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn handle_list_provider_services(
    AxumState(app_state): AxumState<AppState>,
    Identity(_actor): Identity,
    Path(provider_id): Path<i64>,
) -> Result<Json<Vec<ProviderServiceInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let services: Vec<ProviderServiceInfo> =
        ndis_market_api::list_provider_services(&mut persistence, provider_id)?;
    Ok(Json(services))
}

// Bookings

pub async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Created<BookingSummary>, HttpError> {
    info!(
        user_id = actor.user_id,
        provider_id = req.provider_id,
        "Handling create_booking request"
    );
    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingSummary =
        ndis_market_api::create_booking(&mut persistence, &app_state.ctx, &actor, req)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<BookingSummary>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let bookings: Vec<BookingSummary> =
        ndis_market_api::list_bookings(&mut persistence, &actor, &query)?;
    Ok(Json(bookings))
}

pub async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingSummary>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingSummary =
        ndis_market_api::get_booking(&mut persistence, &actor, booking_id)?;
    Ok(Json(booking))
}

pub async fn handle_booking_history(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(booking_id): Path<i64>,
) -> Result<Json<Vec<StatusHistoryInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let history: Vec<StatusHistoryInfo> =
        ndis_market_api::booking_history(&mut persistence, &actor, booking_id)?;
    Ok(Json(history))
}

pub async fn handle_list_check_ins(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(booking_id): Path<i64>,
) -> Result<Json<Vec<CheckInInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let records: Vec<CheckInInfo> =
        ndis_market_api::list_check_ins(&mut persistence, &actor, booking_id)?;
    Ok(Json(records))
}

pub async fn handle_accept_booking(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingSummary>, HttpError> {
    info!(booking_id, user_id = actor.user_id, "Handling accept_booking request");
    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingSummary =
        ndis_market_api::accept_booking(&mut persistence, &app_state.ctx, &actor, booking_id)?;
    Ok(Json(booking))
}

pub async fn handle_decline_booking(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(booking_id): Path<i64>,
    body: Option<Json<ReasonRequest>>,
) -> Result<Json<BookingSummary>, HttpError> {
    info!(booking_id, user_id = actor.user_id, "Handling decline_booking request");
    let req: ReasonRequest = body.map(|Json(req)| req).unwrap_or_default();
    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingSummary = ndis_market_api::decline_booking(
        &mut persistence,
        &app_state.ctx,
        &actor,
        booking_id,
        req,
    )?;
    Ok(Json(booking))
}

pub async fn handle_check_in(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(booking_id): Path<i64>,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<BookingSummary>, HttpError> {
    info!(
        booking_id,
        user_id = actor.user_id,
        check_type = %req.check_type,
        "Handling check_in request"
    );
    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingSummary =
        ndis_market_api::check_in(&mut persistence, &app_state.ctx, &actor, booking_id, req)?;
    Ok(Json(booking))
}

pub async fn handle_confirm_booking(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingSummary>, HttpError> {
    info!(
        booking_id,
        user_id = actor.user_id,
        role = %actor.role,
        "Handling confirm_booking request"
    );
    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingSummary =
        ndis_market_api::confirm_booking(&mut persistence, &app_state.ctx, &actor, booking_id)?;
    Ok(Json(booking))
}

pub async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(booking_id): Path<i64>,
    body: Option<Json<ReasonRequest>>,
) -> Result<Json<BookingSummary>, HttpError> {
    info!(booking_id, user_id = actor.user_id, "Handling cancel_booking request");
    let req: ReasonRequest = body.map(|Json(req)| req).unwrap_or_default();
    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingSummary = ndis_market_api::cancel_booking(
        &mut persistence,
        &app_state.ctx,
        &actor,
        booking_id,
        req,
    )?;
    Ok(Json(booking))
}

// Invoices

pub async fn handle_create_invoice(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<Created<InvoiceDetail>, HttpError> {
    info!(
        provider_id = req.provider_id,
        participant_id = req.participant_id,
        lines = req.line_items.len(),
        "Handling create_invoice request"
    );
    let mut persistence = app_state.persistence.lock().await;
    let invoice: InvoiceDetail =
        ndis_market_api::create_invoice(&mut persistence, &app_state.ctx, &actor, req)?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn handle_invoice_from_booking(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(booking_id): Path<i64>,
    body: Option<Json<InvoiceFromBookingRequest>>,
) -> Result<Created<InvoiceDetail>, HttpError> {
    info!(booking_id, "Handling invoice_from_booking request");
    let req: InvoiceFromBookingRequest = body.map(|Json(req)| req).unwrap_or_default();
    let mut persistence = app_state.persistence.lock().await;
    let invoice: InvoiceDetail = ndis_market_api::create_invoice_from_booking(
        &mut persistence,
        &app_state.ctx,
        &actor,
        booking_id,
        req,
    )?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn handle_list_invoices(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<Vec<InvoiceInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let invoices: Vec<InvoiceInfo> =
        ndis_market_api::list_invoices(&mut persistence, &actor, &query)?;
    Ok(Json(invoices))
}

pub async fn handle_get_invoice(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(invoice_id): Path<i64>,
) -> Result<Json<InvoiceDetail>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let invoice: InvoiceDetail =
        ndis_market_api::get_invoice(&mut persistence, &actor, invoice_id)?;
    Ok(Json(invoice))
}

pub async fn handle_invoice_history(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(invoice_id): Path<i64>,
) -> Result<Json<Vec<StatusHistoryInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let history: Vec<StatusHistoryInfo> =
        ndis_market_api::invoice_history(&mut persistence, &actor, invoice_id)?;
    Ok(Json(history))
}

pub async fn handle_send_invoice(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(invoice_id): Path<i64>,
) -> Result<Json<InvoiceInfo>, HttpError> {
    info!(invoice_id, user_id = actor.user_id, "Handling send_invoice request");
    let mut persistence = app_state.persistence.lock().await;
    let invoice: InvoiceInfo =
        ndis_market_api::send_invoice(&mut persistence, &app_state.ctx, &actor, invoice_id)?;
    Ok(Json(invoice))
}

pub async fn handle_view_invoice(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(invoice_id): Path<i64>,
) -> Result<Json<InvoiceInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let invoice: InvoiceInfo =
        ndis_market_api::view_invoice(&mut persistence, &app_state.ctx, &actor, invoice_id)?;
    Ok(Json(invoice))
}

pub async fn handle_mark_invoice_paid(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(invoice_id): Path<i64>,
) -> Result<Json<InvoiceInfo>, HttpError> {
    info!(invoice_id, user_id = actor.user_id, "Handling mark_paid request");
    let mut persistence = app_state.persistence.lock().await;
    let invoice: InvoiceInfo =
        ndis_market_api::mark_invoice_paid(&mut persistence, &app_state.ctx, &actor, invoice_id)?;
    Ok(Json(invoice))
}

pub async fn handle_cancel_invoice(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(invoice_id): Path<i64>,
    body: Option<Json<ReasonRequest>>,
) -> Result<Json<InvoiceInfo>, HttpError> {
    info!(invoice_id, user_id = actor.user_id, "Handling cancel_invoice request");
    let req: ReasonRequest = body.map(|Json(req)| req).unwrap_or_default();
    let mut persistence = app_state.persistence.lock().await;
    let invoice: InvoiceInfo = ndis_market_api::cancel_invoice(
        &mut persistence,
        &app_state.ctx,
        &actor,
        invoice_id,
        req,
    )?;
    Ok(Json(invoice))
}

pub async fn handle_mark_overdue(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
) -> Result<Json<OverdueSweepResponse>, HttpError> {
    info!(user_id = actor.user_id, "Handling mark_overdue request");
    let mut persistence = app_state.persistence.lock().await;
    let sweep: OverdueSweepResponse =
        ndis_market_api::mark_overdue(&mut persistence, &app_state.ctx, &actor)?;
    Ok(Json(sweep))
}

// Payments

pub async fn handle_create_payment_intent(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(invoice_id): Path<i64>,
) -> Result<Created<PaymentIntentResponse>, HttpError> {
    info!(invoice_id, user_id = actor.user_id, "Handling payment_intent request");
    let mut persistence = app_state.persistence.lock().await;
    let intent: PaymentIntentResponse = ndis_market_api::create_payment_intent(
        &mut persistence,
        &app_state.ctx,
        &actor,
        invoice_id,
    )?;
    Ok((StatusCode::CREATED, Json(intent)))
}

pub async fn handle_list_payments(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(invoice_id): Path<i64>,
) -> Result<Json<Vec<PaymentInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let payments: Vec<PaymentInfo> =
        ndis_market_api::list_payments(&mut persistence, &actor, invoice_id)?;
    Ok(Json(payments))
}

pub async fn handle_confirm_payment(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(payment_id): Path<i64>,
) -> Result<Json<ConfirmPaymentResponse>, HttpError> {
    info!(payment_id, user_id = actor.user_id, "Handling confirm_payment request");
    let mut persistence = app_state.persistence.lock().await;
    let confirmed: ConfirmPaymentResponse =
        ndis_market_api::confirm_payment(&mut persistence, &app_state.ctx, &actor, payment_id)?;
    Ok(Json(confirmed))
}

pub async fn handle_refund_payment(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(payment_id): Path<i64>,
    body: Option<Json<RefundRequest>>,
) -> Result<Json<RefundResponse>, HttpError> {
    info!(payment_id, user_id = actor.user_id, "Handling refund request");
    let req: RefundRequest = body.map(|Json(req)| req).unwrap_or_default();
    let mut persistence = app_state.persistence.lock().await;
    let refund: RefundResponse = ndis_market_api::refund_payment(
        &mut persistence,
        &app_state.ctx,
        &actor,
        payment_id,
        &req,
    )?;
    Ok(Json(refund))
}

pub async fn handle_create_payout(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<CreatePayoutRequest>,
) -> Result<Created<CreatePayoutResponse>, HttpError> {
    info!(provider_id = req.provider_id, "Handling create_payout request");
    let mut persistence = app_state.persistence.lock().await;
    let payout: CreatePayoutResponse =
        ndis_market_api::create_payout(&mut persistence, &app_state.ctx, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(payout)))
}

pub async fn handle_list_payouts(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(provider_id): Path<i64>,
) -> Result<Json<Vec<PayoutInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let payouts: Vec<PayoutInfo> =
        ndis_market_api::list_payouts(&mut persistence, &actor, provider_id)?;
    Ok(Json(payouts))
}
