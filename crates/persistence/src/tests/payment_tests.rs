// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{Marketplace, invoice_draft, manual_line, now, seed_marketplace};
use crate::{NewPayment, PayoutCandidate, Persistence, PersistenceError, RefundRecord};
use ndis_market::{InvoiceCommand, InvoiceTransition, apply_invoice};
use ndis_market_audit::Actor;
use ndis_market_domain::{
    Invoice, InvoiceStatus, Payment, PaymentStatus, PayoutStatus, ProviderPayout, RefundOutcome,
    plan_refund,
};
use rust_decimal::Decimal;

fn setup() -> (Persistence, Marketplace) {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let market: Marketplace = seed_marketplace(&mut persistence, false);
    (persistence, market)
}

fn sent_invoice(persistence: &mut Persistence, market: &Marketplace, number: &str) -> Invoice {
    let invoice: Invoice = persistence
        .insert_invoice(&invoice_draft(market, &[manual_line(100)], number))
        .unwrap();
    let sent: InvoiceTransition =
        apply_invoice(&invoice, InvoiceCommand::Send, market.provider_actor(), now()).unwrap();
    persistence
        .persist_invoice_transition(InvoiceStatus::Draft, &sent)
        .unwrap()
}

fn pending_payment(persistence: &mut Persistence, invoice: &Invoice, amount: Decimal) -> Payment {
    persistence
        .insert_payment(&NewPayment {
            invoice_id: invoice.id,
            amount,
            payment_method: String::from("card"),
            gateway_reference: String::from("pi_mock_1"),
            created_at: now(),
        })
        .unwrap()
}

/// Completes a payment and settles the invoice against the new paid total.
fn settle(persistence: &mut Persistence, invoice: &Invoice, payment: &Payment) -> Invoice {
    let paid_total: Decimal = persistence.paid_total(invoice.id).unwrap() + payment.amount;
    let settlement: InvoiceTransition = apply_invoice(
        invoice,
        InvoiceCommand::Settle { paid_total },
        Actor::System,
        now(),
    )
    .unwrap();
    persistence
        .complete_payment(payment.id, now(), Some((invoice.status, &settlement)))
        .unwrap();
    persistence.get_invoice(invoice.id).unwrap().unwrap()
}

#[test]
fn test_partial_then_full_payment_settles_invoice() {
    let (mut persistence, market) = setup();
    let invoice: Invoice = sent_invoice(&mut persistence, &market, "INV-202603-0001");
    // Not GST registered: 100 subtotal, 100 total.
    assert_eq!(invoice.totals.total_amount, Decimal::from(100));

    let first: Payment = pending_payment(&mut persistence, &invoice, Decimal::from(40));
    let invoice: Invoice = settle(&mut persistence, &invoice, &first);
    assert_eq!(invoice.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(persistence.paid_total(invoice.id).unwrap(), Decimal::from(40));

    let second: Payment = pending_payment(&mut persistence, &invoice, Decimal::from(60));
    let invoice: Invoice = settle(&mut persistence, &invoice, &second);
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.paid_at, Some(now()));

    let payments = persistence.list_payments(invoice.id).unwrap();
    assert!(payments.iter().all(|p| p.status == PaymentStatus::Completed));
}

#[test]
fn test_completing_twice_is_a_concurrent_modification() {
    let (mut persistence, market) = setup();
    let invoice: Invoice = sent_invoice(&mut persistence, &market, "INV-202603-0001");
    let payment: Payment = pending_payment(&mut persistence, &invoice, Decimal::from(100));
    persistence.complete_payment(payment.id, now(), None).unwrap();

    let result = persistence.complete_payment(payment.id, now(), None);

    assert_eq!(
        result,
        Err(PersistenceError::ConcurrentModification {
            entity: "payment",
            id: payment.id,
        })
    );
}

#[test]
fn test_partial_refund_is_recorded() {
    let (mut persistence, market) = setup();
    let invoice: Invoice = sent_invoice(&mut persistence, &market, "INV-202603-0001");
    let payment: Payment = pending_payment(&mut persistence, &invoice, Decimal::from(100));
    let payment: Payment = persistence.complete_payment(payment.id, now(), None).unwrap();

    let outcome: RefundOutcome = plan_refund(&payment, Some(Decimal::from(30))).unwrap();
    let refunded: Payment = persistence
        .record_refund(
            payment.status,
            &outcome,
            &RefundRecord {
                payment_id: payment.id,
                amount: outcome.refund_amount,
                gateway_reference: String::from("re_mock_1"),
                created_at: now(),
            },
        )
        .unwrap();

    assert_eq!(refunded.status, PaymentStatus::PartiallyRefunded);
    assert_eq!(refunded.refunded_amount, Decimal::from(30));
    assert_eq!(refunded.refundable_amount(), Decimal::from(70));
}

#[test]
fn test_payout_claims_paid_invoices_once() {
    let (mut persistence, market) = setup();
    let first: Invoice = sent_invoice(&mut persistence, &market, "INV-202603-0001");
    let second: Invoice = sent_invoice(&mut persistence, &market, "INV-202603-0002");
    let unpaid: Invoice = sent_invoice(&mut persistence, &market, "INV-202603-0003");
    for invoice in [&first, &second] {
        let payment: Payment = pending_payment(&mut persistence, invoice, Decimal::from(100));
        settle(&mut persistence, invoice, &payment);
    }

    let candidates: Vec<PayoutCandidate> =
        persistence.payout_candidates(market.provider.id).unwrap();
    assert_eq!(candidates.len(), 2);
    assert!(candidates.iter().all(|c| c.invoice_id != unpaid.id));

    let amount: Decimal = candidates.iter().map(|c| c.provider_payout).sum();
    let payout: ProviderPayout = persistence
        .create_payout(market.provider.id, &candidates, amount, "tr_mock_1", now())
        .unwrap();

    // 100 subtotal less a 5 fee, with no fee GST for an unregistered provider.
    assert_eq!(payout.amount, Decimal::from(190));
    assert_eq!(payout.invoice_ids, vec![first.id, second.id]);
    let stored: Invoice = persistence.get_invoice(first.id).unwrap().unwrap();
    assert_eq!(stored.payout_status, PayoutStatus::Processing);
    assert!(
        persistence
            .payout_candidates(market.provider.id)
            .unwrap()
            .is_empty()
    );

    let replay =
        persistence.create_payout(market.provider.id, &candidates, amount, "tr_mock_2", now());
    assert!(matches!(
        replay,
        Err(PersistenceError::ConcurrentModification { .. })
    ));

    let payouts = persistence.list_payouts(market.provider.id).unwrap();
    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].invoice_ids, vec![first.id, second.id]);
}
