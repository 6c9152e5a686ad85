// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ndis_market_domain::{InvoiceStatus, PaymentStatus};
use rust_decimal::Decimal;

use crate::{
    ApiError, CreatePayoutRequest, InvoiceFromBookingRequest, RefundRequest, confirm_payment,
    create_invoice_from_booking, create_payment_intent, create_payout, list_payments,
    list_payouts, refund_payment, send_invoice,
};

use super::helpers::{Market, PROVIDER_EMAIL, book_completed, setup};

/// Completes a booking, invoices it and sends the invoice. Returns its id.
fn sent_invoice(market: &mut Market) -> i64 {
    let booking = book_completed(market);
    let provider = market.provider;
    let detail = create_invoice_from_booking(
        &mut market.persistence,
        &market.ctx,
        &provider,
        booking.id,
        InvoiceFromBookingRequest::default(),
    )
    .expect("invoice");
    send_invoice(&mut market.persistence, &market.ctx, &provider, detail.invoice.id)
        .expect("send");
    detail.invoice.id
}

/// Pays the invoice in full through the gateway. Returns the payment id.
fn paid_invoice(market: &mut Market, invoice_id: i64) -> i64 {
    let participant = market.participant;
    let intent =
        create_payment_intent(&mut market.persistence, &market.ctx, &participant, invoice_id)
            .expect("intent");
    confirm_payment(
        &mut market.persistence,
        &market.ctx,
        &participant,
        intent.payment_id,
    )
    .expect("confirm");
    intent.payment_id
}

#[test]
fn test_intent_covers_outstanding_balance() {
    let mut market = setup();
    let invoice_id = sent_invoice(&mut market);
    let participant = market.participant;

    let intent =
        create_payment_intent(&mut market.persistence, &market.ctx, &participant, invoice_id)
            .expect("intent");
    assert_eq!(intent.amount, Decimal::from(180));
    assert!(intent.intent_id.starts_with("pi_mock_"));
    assert!(intent.client_secret.starts_with(&intent.intent_id));
    assert!(intent.mock_mode);

    let payments = list_payments(&mut market.persistence, &participant, invoice_id)
        .expect("list payments");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status, PaymentStatus::Pending);
}

#[test]
fn test_only_participant_pays_sent_invoices() {
    let mut market = setup();
    let booking = book_completed(&mut market);
    let provider = market.provider;
    let participant = market.participant;
    let detail = create_invoice_from_booking(
        &mut market.persistence,
        &market.ctx,
        &provider,
        booking.id,
        InvoiceFromBookingRequest::default(),
    )
    .expect("invoice");

    assert!(matches!(
        create_payment_intent(
            &mut market.persistence,
            &market.ctx,
            &participant,
            detail.invoice.id,
        ),
        Err(ApiError::BadRequest { .. })
    ));

    send_invoice(&mut market.persistence, &market.ctx, &provider, detail.invoice.id)
        .expect("send");
    assert!(matches!(
        create_payment_intent(&mut market.persistence, &market.ctx, &provider, detail.invoice.id),
        Err(ApiError::Forbidden { .. })
    ));
}

#[test]
fn test_confirm_settles_invoice_and_notifies_provider() {
    let mut market = setup();
    let invoice_id = sent_invoice(&mut market);
    let participant = market.participant;

    let intent =
        create_payment_intent(&mut market.persistence, &market.ctx, &participant, invoice_id)
            .expect("intent");
    let confirmed = confirm_payment(
        &mut market.persistence,
        &market.ctx,
        &participant,
        intent.payment_id,
    )
    .expect("confirm");

    assert_eq!(confirmed.invoice_status, InvoiceStatus::Paid);
    assert_eq!(confirmed.payment.status, PaymentStatus::Completed);
    assert!(confirmed.payment.completed_at.is_some());
    assert!(
        market
            .channel
            .emails_to(PROVIDER_EMAIL)
            .iter()
            .any(|e| e.subject.starts_with("Payment received"))
    );

    let again = confirm_payment(
        &mut market.persistence,
        &market.ctx,
        &participant,
        intent.payment_id,
    );
    assert!(matches!(
        again,
        Err(ApiError::BadRequest { ref rule, .. }) if rule == "payment_state"
    ));

    // Nothing is left to pay.
    assert!(matches!(
        create_payment_intent(&mut market.persistence, &market.ctx, &participant, invoice_id),
        Err(ApiError::BadRequest { .. })
    ));
}

#[test]
fn test_partial_then_full_refund() {
    let mut market = setup();
    let invoice_id = sent_invoice(&mut market);
    let payment_id = paid_invoice(&mut market, invoice_id);
    let provider = market.provider;
    let participant = market.participant;

    assert!(matches!(
        refund_payment(
            &mut market.persistence,
            &market.ctx,
            &participant,
            payment_id,
            &RefundRequest::default(),
        ),
        Err(ApiError::Forbidden { .. })
    ));

    let partial = refund_payment(
        &mut market.persistence,
        &market.ctx,
        &provider,
        payment_id,
        &RefundRequest {
            amount: Some(Decimal::from(30)),
        },
    )
    .expect("partial refund");
    assert_eq!(partial.refund_amount, Decimal::from(30));
    assert!(partial.refund_id.starts_with("re_mock_"));
    assert_eq!(partial.payment.status, PaymentStatus::PartiallyRefunded);
    assert_eq!(partial.payment.refunded_amount, Decimal::from(30));

    let too_much = refund_payment(
        &mut market.persistence,
        &market.ctx,
        &provider,
        payment_id,
        &RefundRequest {
            amount: Some(Decimal::from(200)),
        },
    );
    assert!(matches!(
        too_much,
        Err(ApiError::BadRequest { ref rule, .. }) if rule == "refund_amount"
    ));

    let rest = refund_payment(
        &mut market.persistence,
        &market.ctx,
        &provider,
        payment_id,
        &RefundRequest::default(),
    )
    .expect("refund remainder");
    assert_eq!(rest.refund_amount, Decimal::from(150));
    assert_eq!(rest.payment.status, PaymentStatus::Refunded);

    assert!(matches!(
        refund_payment(
            &mut market.persistence,
            &market.ctx,
            &provider,
            payment_id,
            &RefundRequest::default(),
        ),
        Err(ApiError::BadRequest { .. })
    ));
}

#[test]
fn test_pending_payment_cannot_be_refunded() {
    let mut market = setup();
    let invoice_id = sent_invoice(&mut market);
    let participant = market.participant;
    let provider = market.provider;
    let intent =
        create_payment_intent(&mut market.persistence, &market.ctx, &participant, invoice_id)
            .expect("intent");

    let result = refund_payment(
        &mut market.persistence,
        &market.ctx,
        &provider,
        intent.payment_id,
        &RefundRequest::default(),
    );
    assert!(matches!(result, Err(ApiError::BadRequest { .. })));
}

#[test]
fn test_payout_batches_paid_invoices_once() {
    let mut market = setup();
    let invoice_id = sent_invoice(&mut market);
    paid_invoice(&mut market, invoice_id);
    let provider = market.provider;
    let request = CreatePayoutRequest {
        provider_id: market.provider_id(),
        invoice_ids: None,
    };

    let created = create_payout(&mut market.persistence, &market.ctx, &provider, &request)
        .expect("payout");
    assert_eq!(created.payout.amount, Decimal::from(171));
    assert_eq!(created.payout.invoice_ids, vec![invoice_id]);
    assert!(created.payout.transfer_reference.starts_with("tr_mock_"));
    assert!(created.mock_mode);
    assert!(
        market
            .channel
            .emails_to(PROVIDER_EMAIL)
            .iter()
            .any(|e| e.subject.starts_with("Payout"))
    );

    let again = create_payout(&mut market.persistence, &market.ctx, &provider, &request);
    assert!(matches!(
        again,
        Err(ApiError::BadRequest { ref rule, .. }) if rule == "payout_has_invoices"
    ));

    let provider_id = market.provider_id();
    let payouts =
        list_payouts(&mut market.persistence, &provider, provider_id).expect("list payouts");
    assert_eq!(payouts.len(), 1);
}

#[test]
fn test_payout_respects_requested_invoices_and_ownership() {
    let mut market = setup();
    let invoice_id = sent_invoice(&mut market);
    paid_invoice(&mut market, invoice_id);
    let provider = market.provider;
    let other = market.other_provider;
    let provider_id = market.provider_id();

    let unrelated = create_payout(
        &mut market.persistence,
        &market.ctx,
        &provider,
        &CreatePayoutRequest {
            provider_id,
            invoice_ids: Some(vec![invoice_id + 100]),
        },
    );
    assert!(matches!(unrelated, Err(ApiError::BadRequest { .. })));

    let not_owner = create_payout(
        &mut market.persistence,
        &market.ctx,
        &other,
        &CreatePayoutRequest {
            provider_id,
            invoice_ids: None,
        },
    );
    assert!(matches!(not_owner, Err(ApiError::Forbidden { .. })));

    assert!(matches!(
        list_payouts(&mut market.persistence, &other, provider_id),
        Err(ApiError::Forbidden { .. })
    ));
}
