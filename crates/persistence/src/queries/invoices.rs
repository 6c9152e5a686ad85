// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use ndis_market_audit::StatusHistoryEntry;
use ndis_market_domain::{Invoice, InvoiceLineItem, InvoiceStatus};
use time::Date;
use tracing::debug;

use crate::data_models::{
    InvoiceFilter, InvoiceHistoryRow, InvoiceRow, LineItemRow, format_date,
};
use crate::diesel_schema::{invoice_line_items, invoice_status_history, invoices};
use crate::error::PersistenceError;

/// Retrieves an invoice by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_invoice(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<Option<Invoice>, PersistenceError> {
    debug!(invoice_id, "Looking up invoice");

    invoices::table
        .filter(invoices::id.eq(invoice_id))
        .select(InvoiceRow::as_select())
        .first(conn)
        .optional()?
        .map(InvoiceRow::into_domain)
        .transpose()
}

/// Returns an invoice's line items in line order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_invoice_lines(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<Vec<InvoiceLineItem>, PersistenceError> {
    invoice_line_items::table
        .filter(invoice_line_items::invoice_id.eq(invoice_id))
        .order(invoice_line_items::line_number.asc())
        .select(LineItemRow::as_select())
        .load(conn)?
        .into_iter()
        .map(LineItemRow::into_domain)
        .collect()
}

/// Lists invoices matching a filter, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_invoices(
    conn: &mut SqliteConnection,
    filter: &InvoiceFilter,
) -> Result<Vec<Invoice>, PersistenceError> {
    let mut query = invoices::table.select(InvoiceRow::as_select()).into_boxed();

    if let Some(provider_id) = filter.provider_id {
        query = query.filter(invoices::provider_id.eq(provider_id));
    }
    if let Some(participant_id) = filter.participant_id {
        query = query.filter(invoices::participant_id.eq(participant_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(invoices::status.eq(status.as_str()));
    }

    query
        .order(invoices::id.desc())
        .load(conn)?
        .into_iter()
        .map(InvoiceRow::into_domain)
        .collect()
}

/// Counts a provider's invoices dated in the same calendar month as `date`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_provider_invoices_in_month(
    conn: &mut SqliteConnection,
    provider_id: i64,
    date: Date,
) -> Result<i64, PersistenceError> {
    // invoice_date is RFC 3339, which starts with YYYY-MM.
    let month_prefix: String = format!("{:04}-{:02}-%", date.year(), u8::from(date.month()));

    Ok(invoices::table
        .filter(invoices::provider_id.eq(provider_id))
        .filter(invoices::invoice_date.like(month_prefix))
        .count()
        .get_result(conn)?)
}

/// Returns true if any invoice line item references the booking.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_booking_invoiced(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = invoice_line_items::table
        .filter(invoice_line_items::booking_id.eq(booking_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Returns issued, unpaid, not-yet-overdue invoices whose due date is
/// before `today`.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_overdue_candidates(
    conn: &mut SqliteConnection,
    today: Date,
) -> Result<Vec<Invoice>, PersistenceError> {
    let statuses: [&str; 3] = [
        InvoiceStatus::Sent.as_str(),
        InvoiceStatus::Viewed.as_str(),
        InvoiceStatus::PartiallyPaid.as_str(),
    ];

    invoices::table
        .filter(invoices::status.eq_any(statuses))
        .filter(invoices::due_date.lt(format_date(today)?))
        .order(invoices::id.asc())
        .select(InvoiceRow::as_select())
        .load(conn)?
        .into_iter()
        .map(InvoiceRow::into_domain)
        .collect()
}

/// Returns an invoice's status history, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn invoice_history(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<Vec<StatusHistoryEntry<InvoiceStatus>>, PersistenceError> {
    invoice_status_history::table
        .filter(invoice_status_history::invoice_id.eq(invoice_id))
        .order(invoice_status_history::id.asc())
        .select(InvoiceHistoryRow::as_select())
        .load(conn)?
        .into_iter()
        .map(InvoiceHistoryRow::into_domain)
        .collect()
}

/// Returns true if an invoice row exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn invoice_exists(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = invoices::table
        .filter(invoices::id.eq(invoice_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
