// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Gateway payments, refunds, and provider payouts.

use std::collections::HashSet;

use ndis_market::{InvoiceCommand, InvoiceTransition, apply_invoice};
use ndis_market_domain::{
    DomainError, Invoice, Payment, PaymentStatus, ProviderPayout, ProviderProfile, RefundOutcome,
    payout_amount, plan_refund,
};
use ndis_market_persistence::{NewPayment, PayoutCandidate, Persistence, RefundRecord};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::bookings::notify;
use crate::context::ServiceContext;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::gateway::{GatewayRefund, PaymentIntent, Transfer};
use crate::invoices::{load_invoice, load_provider};
use crate::notifications::MarketEvent;
use crate::request_response::{
    ConfirmPaymentResponse, CreatePayoutRequest, CreatePayoutResponse, PaymentInfo,
    PaymentIntentResponse, PayoutInfo, RefundRequest, RefundResponse,
};

const CARD_METHOD: &str = "card";

/// Opens a gateway intent for the invoice's outstanding balance.
///
/// # Errors
///
/// Returns an error if:
/// - The invoice does not exist (`NotFound`)
/// - The actor is not the invoiced participant (`Forbidden`)
/// - The invoice is not awaiting payment or nothing is outstanding (`BadRequest`)
/// - The gateway fails (`Internal`)
pub fn create_payment_intent(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    invoice_id: i64,
) -> Result<PaymentIntentResponse, ApiError> {
    let invoice: Invoice = load_invoice(persistence, invoice_id)?;
    AuthorizationService::authorize_invoice_participant(actor, &invoice, "pay invoice")?;
    if !invoice.status.is_payable() {
        return Err(translate_domain_error(DomainError::InvalidInvoiceState {
            operation: "pay",
            status: invoice.status,
        }));
    }

    let paid: Decimal = persistence
        .paid_total(invoice.id)
        .map_err(translate_persistence_error)?;
    let outstanding: Decimal = invoice.totals.total_amount - paid;
    if outstanding <= Decimal::ZERO {
        return Err(ApiError::bad_request(
            "outstanding_balance",
            format!("Invoice {} has nothing outstanding", invoice.invoice_number),
        ));
    }

    let intent: PaymentIntent = ctx.gateway.create_intent(invoice.id, outstanding)?;
    let payment: Payment = persistence
        .insert_payment(&NewPayment {
            invoice_id: invoice.id,
            amount: intent.amount,
            payment_method: String::from(CARD_METHOD),
            gateway_reference: intent.intent_id.clone(),
            created_at: ctx.now(),
        })
        .map_err(translate_persistence_error)?;

    info!(
        payment_id = payment.id,
        invoice_id = invoice.id,
        amount = %payment.amount,
        "Payment intent created"
    );
    Ok(PaymentIntentResponse {
        payment_id: payment.id,
        intent_id: intent.intent_id,
        client_secret: intent.client_secret,
        amount: intent.amount,
        mock_mode: ctx.gateway.mock_mode(),
    })
}

/// Captures a pending payment and settles the invoice.
///
/// The invoice becomes `paid` once captured payments cover the total and
/// `partially_paid` before that.
///
/// # Errors
///
/// Returns an error if:
/// - The payment or invoice does not exist (`NotFound`)
/// - The actor is not the invoiced participant (`Forbidden`)
/// - The payment is not pending or the invoice is not payable (`BadRequest`)
/// - Another request completed the payment first (`Conflict`)
pub fn confirm_payment(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    payment_id: i64,
) -> Result<ConfirmPaymentResponse, ApiError> {
    let payment: Payment = load_payment(persistence, payment_id)?;
    let invoice: Invoice = load_invoice(persistence, payment.invoice_id)?;
    AuthorizationService::authorize_invoice_participant(actor, &invoice, "confirm payment")?;
    if payment.status != PaymentStatus::Pending {
        return Err(translate_domain_error(DomainError::InvalidPaymentState {
            operation: "confirm",
            status: payment.status,
        }));
    }

    let captured: Decimal = persistence
        .paid_total(invoice.id)
        .map_err(translate_persistence_error)?;
    let now: OffsetDateTime = ctx.now();
    let settlement: InvoiceTransition = apply_invoice(
        &invoice,
        InvoiceCommand::Settle {
            paid_total: captured + payment.amount,
        },
        actor.to_audit_actor(),
        now,
    )
    .map_err(translate_core_error)?;

    ctx.gateway.confirm_intent(&payment.gateway_reference)?;
    let completed: Payment = persistence
        .complete_payment(payment.id, now, Some((invoice.status, &settlement)))
        .map_err(translate_persistence_error)?;

    info!(
        payment_id,
        invoice_id = invoice.id,
        invoice_status = settlement.invoice.status.as_str(),
        "Payment confirmed"
    );

    if let Some(provider) = persistence
        .get_provider(invoice.provider_id)
        .ok()
        .flatten()
    {
        notify(
            persistence,
            ctx,
            &MarketEvent::PaymentReceived {
                invoice_number: invoice.invoice_number.clone(),
                amount: completed.amount,
            },
            &[provider.user_id],
        );
    }

    Ok(ConfirmPaymentResponse {
        payment: PaymentInfo::from(&completed),
        invoice_status: settlement.invoice.status,
    })
}

/// Refunds part or all of a captured payment.
///
/// # Errors
///
/// Returns an error if:
/// - The payment does not exist (`NotFound`)
/// - The actor does not own the invoice's provider (`Forbidden`)
/// - Nothing is refundable or the amount is out of range (`BadRequest`)
/// - Another refund landed first (`Conflict`)
pub fn refund_payment(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    payment_id: i64,
    request: &RefundRequest,
) -> Result<RefundResponse, ApiError> {
    let payment: Payment = load_payment(persistence, payment_id)?;
    let invoice: Invoice = load_invoice(persistence, payment.invoice_id)?;
    AuthorizationService::authorize_invoice_provider(actor, &invoice, "refund payment")?;

    let outcome: RefundOutcome =
        plan_refund(&payment, request.amount).map_err(translate_domain_error)?;
    let refund: GatewayRefund = ctx
        .gateway
        .refund(&payment.gateway_reference, outcome.refund_amount)?;

    let updated: Payment = persistence
        .record_refund(
            payment.status,
            &outcome,
            &RefundRecord {
                payment_id: payment.id,
                amount: outcome.refund_amount,
                gateway_reference: refund.refund_id.clone(),
                created_at: ctx.now(),
            },
        )
        .map_err(|e| {
            warn!(
                payment_id,
                refund_id = %refund.refund_id,
                error = %e,
                "Refund issued but not recorded"
            );
            translate_persistence_error(e)
        })?;

    info!(
        payment_id,
        amount = %outcome.refund_amount,
        status = outcome.status.as_str(),
        "Payment refunded"
    );
    Ok(RefundResponse {
        payment: PaymentInfo::from(&updated),
        refund_id: refund.refund_id,
        refund_amount: outcome.refund_amount,
        mock_mode: ctx.gateway.mock_mode(),
    })
}

/// Transfers the provider share of paid invoices in one batch.
///
/// Without `invoice_ids` every eligible invoice is included. Listed ids
/// that are not eligible are ignored.
///
/// # Errors
///
/// Returns an error if:
/// - The provider does not exist (`NotFound`)
/// - The actor does not own the provider (`Forbidden`)
/// - No invoice qualifies (`BadRequest`)
/// - An invoice was claimed by a concurrent batch (`Conflict`)
pub fn create_payout(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: &AuthenticatedActor,
    request: &CreatePayoutRequest,
) -> Result<CreatePayoutResponse, ApiError> {
    let provider: ProviderProfile = load_provider(persistence, request.provider_id)?;
    AuthorizationService::authorize_provider(actor, provider.id, "create payout")?;

    let mut candidates: Vec<PayoutCandidate> = persistence
        .payout_candidates(provider.id)
        .map_err(translate_persistence_error)?;
    if let Some(ids) = &request.invoice_ids {
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        candidates.retain(|c| wanted.contains(&c.invoice_id));
    }

    let shares: Vec<Decimal> = candidates.iter().map(|c| c.provider_payout).collect();
    let amount: Decimal = payout_amount(provider.id, &shares).map_err(translate_domain_error)?;

    let transfer: Transfer = ctx.gateway.create_transfer(provider.id, amount)?;
    let payout: ProviderPayout = persistence
        .create_payout(
            provider.id,
            &candidates,
            amount,
            &transfer.transfer_id,
            ctx.now(),
        )
        .map_err(translate_persistence_error)?;

    info!(
        payout_id = payout.id,
        provider_id = provider.id,
        amount = %payout.amount,
        invoices = payout.invoice_ids.len(),
        "Provider payout created"
    );
    notify(
        persistence,
        ctx,
        &MarketEvent::PayoutSent {
            amount: payout.amount,
            invoice_count: payout.invoice_ids.len(),
        },
        &[provider.user_id],
    );

    Ok(CreatePayoutResponse {
        payout: PayoutInfo::from(&payout),
        mock_mode: ctx.gateway.mock_mode(),
    })
}

/// Lists an invoice's payments.
///
/// # Errors
///
/// Returns `NotFound` or `Forbidden`.
pub fn list_payments(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    invoice_id: i64,
) -> Result<Vec<PaymentInfo>, ApiError> {
    let invoice: Invoice = load_invoice(persistence, invoice_id)?;
    AuthorizationService::authorize_invoice_view(actor, &invoice)?;
    let payments: Vec<Payment> = persistence
        .list_payments(invoice_id)
        .map_err(translate_persistence_error)?;
    Ok(payments.iter().map(PaymentInfo::from).collect())
}

/// Lists a provider's payouts.
///
/// # Errors
///
/// Returns `NotFound` or `Forbidden`.
pub fn list_payouts(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    provider_id: i64,
) -> Result<Vec<PayoutInfo>, ApiError> {
    let provider: ProviderProfile = load_provider(persistence, provider_id)?;
    AuthorizationService::authorize_provider(actor, provider.id, "list payouts")?;
    let payouts: Vec<ProviderPayout> = persistence
        .list_payouts(provider.id)
        .map_err(translate_persistence_error)?;
    Ok(payouts.iter().map(PayoutInfo::from).collect())
}

fn load_payment(persistence: &mut Persistence, payment_id: i64) -> Result<Payment, ApiError> {
    persistence
        .get_payment(payment_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Payment", payment_id))
}
