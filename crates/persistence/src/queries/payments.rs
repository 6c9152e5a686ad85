// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment and payout queries.
//!
//! Amounts are stored as decimal text, so sums are computed after loading.

use diesel::prelude::*;
use diesel::SqliteConnection;
use ndis_market_domain::{InvoiceStatus, Payment, PaymentStatus, PayoutStatus, ProviderPayout};
use rust_decimal::Decimal;

use crate::data_models::{PaymentRow, PayoutCandidate, PayoutRow, parse_decimal};
use crate::diesel_schema::{invoices, payments, provider_payouts};
use crate::error::PersistenceError;

/// Retrieves a payment by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_payment(
    conn: &mut SqliteConnection,
    payment_id: i64,
) -> Result<Option<Payment>, PersistenceError> {
    payments::table
        .filter(payments::id.eq(payment_id))
        .select(PaymentRow::as_select())
        .first(conn)
        .optional()?
        .map(PaymentRow::into_domain)
        .transpose()
}

/// Lists an invoice's payments, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_payments(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<Vec<Payment>, PersistenceError> {
    payments::table
        .filter(payments::invoice_id.eq(invoice_id))
        .order(payments::id.asc())
        .select(PaymentRow::as_select())
        .load(conn)?
        .into_iter()
        .map(PaymentRow::into_domain)
        .collect()
}

/// Sums the captured amount of every non-pending payment on an invoice.
///
/// Refunds do not reduce the total.
///
/// # Errors
///
/// Returns an error if the query fails or an amount cannot be decoded.
pub fn paid_total(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<Decimal, PersistenceError> {
    let amounts: Vec<String> = payments::table
        .filter(payments::invoice_id.eq(invoice_id))
        .filter(payments::status.ne(PaymentStatus::Pending.as_str()))
        .select(payments::amount)
        .load(conn)?;

    amounts
        .iter()
        .try_fold(
            Decimal::ZERO,
            |total: Decimal, amount: &String| -> Result<Decimal, PersistenceError> {
                Ok(total + parse_decimal(amount)?)
            },
        )
}

/// Returns a provider's paid invoices that have not been batched for payout.
///
/// # Errors
///
/// Returns an error if the query fails or an amount cannot be decoded.
pub fn payout_candidates(
    conn: &mut SqliteConnection,
    provider_id: i64,
) -> Result<Vec<PayoutCandidate>, PersistenceError> {
    let rows: Vec<(i64, String)> = invoices::table
        .filter(invoices::provider_id.eq(provider_id))
        .filter(invoices::status.eq(InvoiceStatus::Paid.as_str()))
        .filter(invoices::payout_status.eq(PayoutStatus::Pending.as_str()))
        .order(invoices::id.asc())
        .select((invoices::id, invoices::provider_payout))
        .load(conn)?;

    rows.into_iter()
        .map(|(invoice_id, payout)| -> Result<PayoutCandidate, PersistenceError> {
            Ok(PayoutCandidate {
                invoice_id,
                provider_payout: parse_decimal(&payout)?,
            })
        })
        .collect()
}

/// Lists a provider's payouts, newest first, with the invoices each batched.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_payouts(
    conn: &mut SqliteConnection,
    provider_id: i64,
) -> Result<Vec<ProviderPayout>, PersistenceError> {
    let rows: Vec<PayoutRow> = provider_payouts::table
        .filter(provider_payouts::provider_id.eq(provider_id))
        .order(provider_payouts::id.desc())
        .select(PayoutRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row: PayoutRow| -> Result<ProviderPayout, PersistenceError> {
            let invoice_ids: Vec<i64> = invoices::table
                .filter(invoices::payout_id.eq(row.id()))
                .order(invoices::id.asc())
                .select(invoices::id)
                .load(conn)?;
            row.into_domain(invoice_ids)
        })
        .collect()
}
