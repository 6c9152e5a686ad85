// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payments against invoices and provider payout batches.

use crate::error::DomainError;
use crate::invoice_status::{InvoiceStatus, PaymentStatus};
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// A payment captured (or pending capture) against an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: i64,
    pub invoice_id: i64,
    pub amount: Decimal,
    pub refunded_amount: Decimal,
    pub status: PaymentStatus,
    pub payment_method: String,
    pub gateway_reference: String,
    pub created_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
}

impl Payment {
    /// Captured funds not yet refunded.
    #[must_use]
    pub fn refundable_amount(&self) -> Decimal {
        if self.status.is_refundable() {
            self.amount - self.refunded_amount
        } else {
            Decimal::ZERO
        }
    }
}

/// The payment state after a refund is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundOutcome {
    pub refund_amount: Decimal,
    pub refunded_total: Decimal,
    pub status: PaymentStatus,
}

/// Validates a refund and computes the resulting payment state.
///
/// A missing amount refunds everything still refundable.
///
/// # Errors
///
/// Returns `DomainError::InvalidPaymentState` if the payment has no captured
/// funds, or `DomainError::InvalidRefundAmount` if the amount is not
/// positive or exceeds what is refundable.
pub fn plan_refund(
    payment: &Payment,
    requested: Option<Decimal>,
) -> Result<RefundOutcome, DomainError> {
    if !payment.status.is_refundable() {
        return Err(DomainError::InvalidPaymentState {
            operation: "refund",
            status: payment.status,
        });
    }

    let refundable: Decimal = payment.refundable_amount();
    let refund_amount: Decimal = requested.unwrap_or(refundable);
    if refund_amount <= Decimal::ZERO || refund_amount > refundable {
        return Err(DomainError::InvalidRefundAmount {
            requested: refund_amount,
            refundable,
        });
    }

    let refunded_total: Decimal = payment.refunded_amount + refund_amount;
    let status: PaymentStatus = if refunded_total >= payment.amount {
        PaymentStatus::Refunded
    } else {
        PaymentStatus::PartiallyRefunded
    };
    Ok(RefundOutcome {
        refund_amount,
        refunded_total,
        status,
    })
}

/// Invoice status once `paid_total` has been captured against `total_amount`.
#[must_use]
pub fn settlement_status(total_amount: Decimal, paid_total: Decimal) -> InvoiceStatus {
    if paid_total >= total_amount {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::PartiallyPaid
    }
}

/// A batch transfer of provider shares for paid invoices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPayout {
    pub id: i64,
    pub provider_id: i64,
    pub amount: Decimal,
    pub invoice_ids: Vec<i64>,
    pub transfer_reference: String,
    pub created_at: OffsetDateTime,
}

/// Sums the provider share of each invoice in a payout batch.
///
/// # Errors
///
/// Returns `DomainError::EmptyPayoutBatch` if no invoice qualifies.
pub fn payout_amount(
    provider_id: i64,
    provider_payouts: &[Decimal],
) -> Result<Decimal, DomainError> {
    if provider_payouts.is_empty() {
        return Err(DomainError::EmptyPayoutBatch { provider_id });
    }
    Ok(provider_payouts.iter().copied().sum())
}
