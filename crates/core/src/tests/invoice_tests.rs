// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    create_test_invoice, create_test_participant, create_test_provider, now, participant_actor,
    provider_actor,
};
use crate::{
    CoreError, InvoiceCommand, InvoiceDraft, InvoiceParties, InvoiceTransition, apply_invoice,
    draft_invoice,
};
use ndis_market_domain::{
    BillToType, DomainError, Invoice, InvoiceStatus, LineItemInput, ParticipantProfile,
    PlatformSettings, ProviderProfile,
};
use rust_decimal::Decimal;
use time::macros::date;

fn item(quantity: i64, unit_rate: Decimal) -> LineItemInput {
    LineItemInput {
        booking_id: None,
        description: String::from("Community access"),
        ndis_item_number: None,
        service_date: date!(2026 - 03 - 02),
        quantity: Decimal::from(quantity),
        unit: String::from("hour"),
        unit_rate,
        gst_applicable: None,
    }
}

fn draft(provider: &ProviderProfile, items: &[LineItemInput]) -> Result<InvoiceDraft, CoreError> {
    let participant: ParticipantProfile = create_test_participant();
    draft_invoice(
        InvoiceParties {
            provider,
            participant: &participant,
        },
        items,
        None,
        String::from("INV-202603-0001"),
        provider_actor(),
        now(),
        &PlatformSettings::default(),
    )
}

#[test]
fn test_draft_invoice_computes_fees() {
    let provider: ProviderProfile = create_test_provider(true);
    let result = draft(&provider, &[item(4, Decimal::from(50))]).unwrap();
    let totals = result.invoice.totals;

    assert_eq!(totals.subtotal, Decimal::from(200));
    assert_eq!(totals.gst_amount, Decimal::from(20));
    assert_eq!(totals.platform_fee, Decimal::from(10));
    assert_eq!(totals.platform_fee_gst, Decimal::ONE);
    assert_eq!(totals.total_amount, Decimal::from(220));
    assert_eq!(totals.provider_payout, Decimal::from(209));
}

#[test]
fn test_draft_invoice_copies_billing_from_participant() {
    let provider: ProviderProfile = create_test_provider(false);
    let result = draft(&provider, &[item(1, Decimal::from(80))]).unwrap();

    assert_eq!(result.invoice.bill_to_type, BillToType::PlanManaged);
    assert_eq!(result.invoice.plan_manager_id.as_deref(), Some("PM-77"));
    assert_eq!(result.invoice.due_date, date!(2026 - 03 - 16));
    assert_eq!(result.status_change.to, InvoiceStatus::Draft);
    assert_eq!(result.status_change.from, None);
}

#[test]
fn test_draft_invoice_without_lines_rejected() {
    let provider: ProviderProfile = create_test_provider(true);
    assert_eq!(
        draft(&provider, &[]),
        Err(CoreError::DomainViolation(DomainError::EmptyInvoice))
    );
}

fn run(invoice: &Invoice, command: InvoiceCommand) -> Result<InvoiceTransition, CoreError> {
    apply_invoice(invoice, command, provider_actor(), now())
}

#[test]
fn test_send_only_from_draft() {
    let sent = run(&create_test_invoice(InvoiceStatus::Draft), InvoiceCommand::Send).unwrap();
    assert_eq!(sent.invoice.status, InvoiceStatus::Sent);
    assert_eq!(sent.invoice.sent_at, Some(now()));

    let again = run(&sent.invoice, InvoiceCommand::Send);
    assert_eq!(
        again,
        Err(CoreError::DomainViolation(DomainError::InvalidInvoiceState {
            operation: "send",
            status: InvoiceStatus::Sent,
        }))
    );
}

#[test]
fn test_mark_viewed_is_idempotent() {
    let invoice: Invoice = create_test_invoice(InvoiceStatus::Sent);
    let viewed = apply_invoice(&invoice, InvoiceCommand::MarkViewed, participant_actor(), now())
        .unwrap();
    assert_eq!(viewed.invoice.status, InvoiceStatus::Viewed);
    assert_eq!(viewed.invoice.viewed_at, Some(now()));

    let again = apply_invoice(
        &viewed.invoice,
        InvoiceCommand::MarkViewed,
        participant_actor(),
        now(),
    )
    .unwrap();
    assert!(!again.changed);
    assert!(again.status_change.is_none());

    let draft = run(&create_test_invoice(InvoiceStatus::Draft), InvoiceCommand::MarkViewed);
    assert!(draft.is_err());
}

#[test]
fn test_mark_paid_from_payable_states() {
    for status in [
        InvoiceStatus::Sent,
        InvoiceStatus::Viewed,
        InvoiceStatus::PartiallyPaid,
    ] {
        let paid = run(&create_test_invoice(status), InvoiceCommand::MarkPaid).unwrap();
        assert_eq!(paid.invoice.status, InvoiceStatus::Paid);
        assert_eq!(paid.invoice.paid_at, Some(now()));
    }
    for status in [
        InvoiceStatus::Draft,
        InvoiceStatus::Paid,
        InvoiceStatus::Cancelled,
    ] {
        assert!(run(&create_test_invoice(status), InvoiceCommand::MarkPaid).is_err());
    }
}

#[test]
fn test_settle_partial_then_full() {
    let invoice: Invoice = create_test_invoice(InvoiceStatus::Sent);
    let partial = run(
        &invoice,
        InvoiceCommand::Settle {
            paid_total: Decimal::from(100),
        },
    )
    .unwrap();
    assert_eq!(partial.invoice.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(partial.invoice.paid_at, None);

    let still_partial = run(
        &partial.invoice,
        InvoiceCommand::Settle {
            paid_total: Decimal::from(150),
        },
    )
    .unwrap();
    assert!(!still_partial.changed);

    let full = run(
        &partial.invoice,
        InvoiceCommand::Settle {
            paid_total: Decimal::from(220),
        },
    )
    .unwrap();
    assert_eq!(full.invoice.status, InvoiceStatus::Paid);
    assert_eq!(full.invoice.paid_at, Some(now()));
}

#[test]
fn test_cancel_blocked_once_paid_or_cancelled() {
    let cancelled = run(
        &create_test_invoice(InvoiceStatus::Sent),
        InvoiceCommand::Cancel {
            reason: Some(String::from("Wrong participant")),
        },
    )
    .unwrap();
    assert_eq!(cancelled.invoice.status, InvoiceStatus::Cancelled);
    assert_eq!(
        cancelled.invoice.cancellation_reason.as_deref(),
        Some("Wrong participant")
    );

    for status in [InvoiceStatus::Paid, InvoiceStatus::Cancelled] {
        let result = run(
            &create_test_invoice(status),
            InvoiceCommand::Cancel { reason: None },
        );
        assert_eq!(
            result,
            Err(CoreError::DomainViolation(DomainError::InvalidInvoiceState {
                operation: "cancel",
                status,
            }))
        );
    }
}

#[test]
fn test_mark_overdue_after_due_date() {
    let invoice: Invoice = create_test_invoice(InvoiceStatus::Sent);

    let early = run(
        &invoice,
        InvoiceCommand::MarkOverdue {
            today: date!(2026 - 03 - 17),
        },
    );
    assert!(early.is_err());

    let late = run(
        &invoice,
        InvoiceCommand::MarkOverdue {
            today: date!(2026 - 03 - 18),
        },
    )
    .unwrap();
    assert_eq!(late.invoice.status, InvoiceStatus::Overdue);

    let paid_late = run(
        &late.invoice,
        InvoiceCommand::Settle {
            paid_total: Decimal::from(220),
        },
    )
    .unwrap();
    assert_eq!(paid_late.invoice.status, InvoiceStatus::Paid);
}
