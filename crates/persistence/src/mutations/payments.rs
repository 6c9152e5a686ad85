// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment, refund, and payout mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use ndis_market::InvoiceTransition;
use ndis_market_domain::{
    InvoiceStatus, Payment, PaymentStatus, PayoutStatus, ProviderPayout, RefundOutcome,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::{NewPayment, PayoutCandidate, RefundRecord, format_timestamp};
use crate::diesel_schema::{invoices, payment_refunds, payments, provider_payouts};
use crate::error::PersistenceError;
use crate::mutations::invoices::apply_invoice_changes;
use crate::queries::payments::get_payment;

/// Records a pending payment and returns it.
///
/// # Errors
///
/// Returns an error if the invoice does not exist or the insert fails.
pub fn insert_payment(
    conn: &mut SqliteConnection,
    payment: &NewPayment,
) -> Result<Payment, PersistenceError> {
    diesel::insert_into(payments::table)
        .values((
            payments::invoice_id.eq(payment.invoice_id),
            payments::amount.eq(payment.amount.to_string()),
            payments::refunded_amount.eq(Decimal::ZERO.to_string()),
            payments::status.eq(PaymentStatus::Pending.as_str()),
            payments::payment_method.eq(&payment.payment_method),
            payments::gateway_reference.eq(&payment.gateway_reference),
            payments::created_at.eq(format_timestamp(payment.created_at)?),
        ))
        .execute(conn)?;

    let payment_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        payment_id,
        invoice_id = payment.invoice_id,
        amount = %payment.amount,
        "Recorded payment intent"
    );

    load_payment(conn, payment_id)
}

/// Marks a pending payment completed and applies the resulting invoice
/// settlement in the same transaction.
///
/// `settlement` pairs the invoice status the caller read with the
/// transition it computed from the new paid total.
///
/// # Errors
///
/// Returns `PersistenceError::ConcurrentModification` if the payment is no
/// longer pending or the invoice status moved.
pub fn complete_payment(
    conn: &mut SqliteConnection,
    payment_id: i64,
    completed_at: OffsetDateTime,
    settlement: Option<(InvoiceStatus, &InvoiceTransition)>,
) -> Result<Payment, PersistenceError> {
    let completed_at: String = format_timestamp(completed_at)?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            payments::table
                .filter(payments::id.eq(payment_id))
                .filter(payments::status.eq(PaymentStatus::Pending.as_str())),
        )
        .set((
            payments::status.eq(PaymentStatus::Completed.as_str()),
            payments::completed_at.eq(&completed_at),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Err(missing_or_moved(conn, payment_id)?);
        }

        if let Some((expected_status, transition)) = settlement.filter(|(_, t)| t.changed) {
            apply_invoice_changes(conn, expected_status, transition)?;
        }
        Ok(())
    })?;

    info!(payment_id, "Payment completed");
    load_payment(conn, payment_id)
}

/// Applies a planned refund to a payment and records the refund row.
///
/// # Errors
///
/// Returns `PersistenceError::ConcurrentModification` if the payment status
/// is no longer `expected_status`.
pub fn record_refund(
    conn: &mut SqliteConnection,
    expected_status: PaymentStatus,
    outcome: &RefundOutcome,
    refund: &RefundRecord,
) -> Result<Payment, PersistenceError> {
    let created_at: String = format_timestamp(refund.created_at)?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            payments::table
                .filter(payments::id.eq(refund.payment_id))
                .filter(payments::status.eq(expected_status.as_str())),
        )
        .set((
            payments::refunded_amount.eq(outcome.refunded_total.to_string()),
            payments::status.eq(outcome.status.as_str()),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Err(missing_or_moved(conn, refund.payment_id)?);
        }

        diesel::insert_into(payment_refunds::table)
            .values((
                payment_refunds::payment_id.eq(refund.payment_id),
                payment_refunds::amount.eq(refund.amount.to_string()),
                payment_refunds::gateway_reference.eq(&refund.gateway_reference),
                payment_refunds::created_at.eq(&created_at),
            ))
            .execute(conn)?;
        Ok(())
    })?;

    info!(
        payment_id = refund.payment_id,
        amount = %refund.amount,
        status = %outcome.status,
        "Refund recorded"
    );
    load_payment(conn, refund.payment_id)
}

/// Inserts a payout and moves its invoices to `processing`.
///
/// Only invoices that are still `paid` with a pending payout are claimed.
/// If any candidate was claimed by another batch in the meantime, nothing
/// is written.
///
/// # Errors
///
/// Returns `PersistenceError::ConcurrentModification` if not every
/// candidate could be claimed.
pub fn create_payout(
    conn: &mut SqliteConnection,
    provider_id: i64,
    candidates: &[PayoutCandidate],
    amount: Decimal,
    transfer_reference: &str,
    created_at: OffsetDateTime,
) -> Result<ProviderPayout, PersistenceError> {
    let invoice_ids: Vec<i64> = candidates.iter().map(|c| c.invoice_id).collect();
    let invoice_count: i32 = i32::try_from(invoice_ids.len()).map_err(|_| {
        PersistenceError::SerializationError(format!("{} invoices", invoice_ids.len()))
    })?;

    let payout_id: i64 = conn.transaction::<i64, PersistenceError, _>(|conn| {
        diesel::insert_into(provider_payouts::table)
            .values((
                provider_payouts::provider_id.eq(provider_id),
                provider_payouts::amount.eq(amount.to_string()),
                provider_payouts::invoice_count.eq(invoice_count),
                provider_payouts::transfer_reference.eq(transfer_reference),
                provider_payouts::created_at.eq(format_timestamp(created_at)?),
            ))
            .execute(conn)?;
        let payout_id: i64 = conn.get_last_insert_rowid()?;

        let claimed: usize = diesel::update(
            invoices::table
                .filter(invoices::id.eq_any(&invoice_ids))
                .filter(invoices::provider_id.eq(provider_id))
                .filter(invoices::status.eq(InvoiceStatus::Paid.as_str()))
                .filter(invoices::payout_status.eq(PayoutStatus::Pending.as_str())),
        )
        .set((
            invoices::payout_status.eq(PayoutStatus::Processing.as_str()),
            invoices::payout_id.eq(Some(payout_id)),
        ))
        .execute(conn)?;

        if claimed != invoice_ids.len() {
            return Err(PersistenceError::ConcurrentModification {
                entity: "payout batch for provider",
                id: provider_id,
            });
        }
        Ok(payout_id)
    })?;

    info!(
        payout_id,
        provider_id,
        amount = %amount,
        invoice_count,
        "Created provider payout"
    );

    Ok(ProviderPayout {
        id: payout_id,
        provider_id,
        amount,
        invoice_ids,
        transfer_reference: transfer_reference.to_string(),
        created_at,
    })
}

fn load_payment(conn: &mut SqliteConnection, payment_id: i64) -> Result<Payment, PersistenceError> {
    get_payment(conn, payment_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("payment {payment_id}")))
}

fn missing_or_moved(
    conn: &mut SqliteConnection,
    payment_id: i64,
) -> Result<PersistenceError, PersistenceError> {
    Ok(if get_payment(conn, payment_id)?.is_some() {
        PersistenceError::ConcurrentModification {
            entity: "payment",
            id: payment_id,
        }
    } else {
        PersistenceError::NotFound(format!("payment {payment_id}"))
    })
}
