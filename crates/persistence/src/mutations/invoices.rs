// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use ndis_market::{InvoiceDraft, InvoiceTransition};
use ndis_market_audit::StatusChange;
use ndis_market_domain::{Invoice, InvoiceStatus, PricedLineItem};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{
    InvoiceChanges, NewInvoiceRow, format_date, format_timestamp, line_number_to_row,
};
use crate::diesel_schema::{invoice_line_items, invoice_status_history, invoices};
use crate::error::PersistenceError;
use crate::queries::invoices::{get_invoice, invoice_exists};

/// Inserts an invoice, its line items, and its creation history row.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the provider already
/// has an invoice with this number, or
/// `PersistenceError::BookingAlreadyInvoiced` if a line item bills a
/// booking that is already invoiced. Nothing is written in either case.
pub fn insert_invoice(
    conn: &mut SqliteConnection,
    draft: &InvoiceDraft,
) -> Result<Invoice, PersistenceError> {
    let row: NewInvoiceRow = NewInvoiceRow::from_new(&draft.invoice, draft.status_change.to)?;

    let invoice_id: i64 = conn.transaction::<i64, PersistenceError, _>(|conn| {
        diesel::insert_into(invoices::table)
            .values(&row)
            .execute(conn)?;
        let invoice_id: i64 = conn.get_last_insert_rowid()?;

        for line in &draft.invoice.lines {
            insert_line_item(conn, invoice_id, line)?;
        }
        insert_invoice_history(conn, invoice_id, &draft.status_change)?;
        Ok(invoice_id)
    })?;

    info!(
        invoice_id,
        invoice_number = %draft.invoice.invoice_number,
        total = %draft.invoice.totals.total_amount,
        "Created invoice"
    );

    get_invoice(conn, invoice_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("invoice {invoice_id}")))
}

/// Writes an invoice transition and its history row.
///
/// The update only applies while the stored status is still
/// `expected_status`. Unchanged transitions are not written.
///
/// # Errors
///
/// Returns `PersistenceError::ConcurrentModification` if the stored status
/// moved, or `PersistenceError::NotFound` if the invoice no longer exists.
pub fn persist_invoice_transition(
    conn: &mut SqliteConnection,
    expected_status: InvoiceStatus,
    transition: &InvoiceTransition,
) -> Result<Invoice, PersistenceError> {
    let invoice: &Invoice = &transition.invoice;
    if !transition.changed {
        debug!(invoice_id = invoice.id, "Invoice unchanged; nothing to write");
        return Ok(invoice.clone());
    }

    conn.transaction::<(), PersistenceError, _>(|conn| {
        apply_invoice_changes(conn, expected_status, transition)
    })?;

    info!(
        invoice_id = invoice.id,
        status = %invoice.status,
        "Persisted invoice transition"
    );
    Ok(invoice.clone())
}

/// Updates the invoice row and writes the history row.
///
/// Must run inside a transaction.
pub(crate) fn apply_invoice_changes(
    conn: &mut SqliteConnection,
    expected_status: InvoiceStatus,
    transition: &InvoiceTransition,
) -> Result<(), PersistenceError> {
    let invoice: &Invoice = &transition.invoice;
    let changes: InvoiceChanges = InvoiceChanges::from_invoice(invoice)?;

    let updated: usize = diesel::update(
        invoices::table
            .filter(invoices::id.eq(invoice.id))
            .filter(invoices::status.eq(expected_status.as_str())),
    )
    .set(&changes)
    .execute(conn)?;

    if updated == 0 {
        return Err(if invoice_exists(conn, invoice.id)? {
            PersistenceError::ConcurrentModification {
                entity: "invoice",
                id: invoice.id,
            }
        } else {
            PersistenceError::NotFound(format!("invoice {}", invoice.id))
        });
    }

    if let Some(change) = &transition.status_change {
        insert_invoice_history(conn, invoice.id, change)?;
    }
    Ok(())
}

fn insert_line_item(
    conn: &mut SqliteConnection,
    invoice_id: i64,
    line: &PricedLineItem,
) -> Result<(), PersistenceError> {
    let result: Result<usize, diesel::result::Error> =
        diesel::insert_into(invoice_line_items::table)
            .values((
                invoice_line_items::invoice_id.eq(invoice_id),
                invoice_line_items::line_number.eq(line_number_to_row(line.line_number)?),
                invoice_line_items::booking_id.eq(line.booking_id),
                invoice_line_items::description.eq(&line.description),
                invoice_line_items::ndis_item_number.eq(&line.ndis_item_number),
                invoice_line_items::service_date.eq(format_date(line.service_date)?),
                invoice_line_items::quantity.eq(line.quantity.to_string()),
                invoice_line_items::unit.eq(&line.unit),
                invoice_line_items::unit_rate.eq(line.unit_rate.to_string()),
                invoice_line_items::line_total.eq(line.line_total.to_string()),
                invoice_line_items::gst_applicable.eq(line.gst_applicable),
                invoice_line_items::gst_amount.eq(line.gst_amount.to_string()),
            ))
            .execute(conn);

    match (result, line.booking_id) {
        (Ok(_), _) => Ok(()),
        (
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )),
            Some(booking_id),
        ) => Err(PersistenceError::BookingAlreadyInvoiced { booking_id }),
        (Err(e), _) => Err(e.into()),
    }
}

fn insert_invoice_history(
    conn: &mut SqliteConnection,
    invoice_id: i64,
    change: &StatusChange<InvoiceStatus>,
) -> Result<(), PersistenceError> {
    diesel::insert_into(invoice_status_history::table)
        .values((
            invoice_status_history::invoice_id.eq(invoice_id),
            invoice_status_history::from_status.eq(change.from.map(|s| s.as_str())),
            invoice_status_history::to_status.eq(change.to.as_str()),
            invoice_status_history::changed_by.eq(change.actor.user_id()),
            invoice_status_history::changed_by_role.eq(change.actor.role_str()),
            invoice_status_history::reason.eq(&change.reason),
            invoice_status_history::created_at.eq(format_timestamp(change.at)?),
        ))
        .execute(conn)?;
    Ok(())
}
