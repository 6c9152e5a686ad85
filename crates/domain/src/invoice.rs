// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice entities and the line/fee arithmetic.
//!
//! Line amounts are rounded to cents individually, so the aggregate GST is
//! the sum of the rounded line GST amounts and the identities
//! `total = subtotal + gst` and `payout = total - fee - fee_gst` hold exactly.

use crate::error::DomainError;
use crate::invoice_status::{InvoiceStatus, PayoutStatus};
use crate::money::{ensure_non_negative, round_money};
use crate::settings::PlatformSettings;
use crate::types::BillToType;
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

/// A requested line item before pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemInput {
    pub booking_id: Option<i64>,
    pub description: String,
    pub ndis_item_number: Option<String>,
    pub service_date: Date,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_rate: Decimal,
    /// Overrides the provider's GST registration for this line.
    pub gst_applicable: Option<bool>,
}

/// A priced line item, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLineItem {
    pub line_number: u32,
    pub booking_id: Option<i64>,
    pub description: String,
    pub ndis_item_number: Option<String>,
    pub service_date: Date,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_rate: Decimal,
    pub line_total: Decimal,
    pub gst_applicable: bool,
    pub gst_amount: Decimal,
}

/// Aggregate amounts of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub gst_amount: Decimal,
    pub platform_fee: Decimal,
    pub platform_fee_gst: Decimal,
    pub total_amount: Decimal,
    pub provider_payout: Decimal,
}

/// Prices each requested line and numbers them from 1 in input order.
///
/// # Errors
///
/// Returns an error if there are no lines, a quantity is not positive, or
/// a unit rate is negative.
pub fn price_line_items(
    items: &[LineItemInput],
    provider_gst_registered: bool,
    settings: &PlatformSettings,
) -> Result<Vec<PricedLineItem>, DomainError> {
    if items.is_empty() {
        return Err(DomainError::EmptyInvoice);
    }

    let mut priced: Vec<PricedLineItem> = Vec::with_capacity(items.len());
    for (line_number, item) in (1_u32..).zip(items) {
        if item.quantity <= Decimal::ZERO {
            return Err(DomainError::InvalidQuantity {
                line_number,
                quantity: item.quantity,
            });
        }
        ensure_non_negative("unit_rate", item.unit_rate)?;

        let line_total: Decimal = round_money(item.quantity * item.unit_rate);
        let gst_applicable: bool = item.gst_applicable.unwrap_or(provider_gst_registered);
        let gst_amount: Decimal = if gst_applicable {
            round_money(line_total * settings.gst_rate)
        } else {
            Decimal::ZERO
        };

        priced.push(PricedLineItem {
            line_number,
            booking_id: item.booking_id,
            description: item.description.clone(),
            ndis_item_number: item.ndis_item_number.clone(),
            service_date: item.service_date,
            quantity: item.quantity,
            unit: item.unit.clone(),
            unit_rate: item.unit_rate,
            line_total,
            gst_applicable,
            gst_amount,
        });
    }
    Ok(priced)
}

/// Computes the invoice aggregates from priced lines.
#[must_use]
pub fn compute_invoice_totals(
    lines: &[PricedLineItem],
    provider_gst_registered: bool,
    settings: &PlatformSettings,
) -> InvoiceTotals {
    let subtotal: Decimal = lines.iter().map(|l| l.line_total).sum();
    let gst_amount: Decimal = lines.iter().map(|l| l.gst_amount).sum();
    let platform_fee: Decimal = round_money(subtotal * settings.platform_fee_rate);
    let platform_fee_gst: Decimal = if provider_gst_registered {
        round_money(platform_fee * settings.gst_rate)
    } else {
        Decimal::ZERO
    };
    let total_amount: Decimal = subtotal + gst_amount;
    let provider_payout: Decimal = total_amount - platform_fee - platform_fee_gst;

    InvoiceTotals {
        subtotal,
        gst_amount,
        platform_fee,
        platform_fee_gst,
        total_amount,
        provider_payout,
    }
}

/// A persisted invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub provider_id: i64,
    pub participant_id: i64,
    pub bill_to_type: BillToType,
    pub plan_manager_id: Option<String>,
    pub totals: InvoiceTotals,
    pub invoice_date: OffsetDateTime,
    pub due_date: Date,
    pub status: InvoiceStatus,
    pub payout_status: PayoutStatus,
    pub sent_at: Option<OffsetDateTime>,
    pub viewed_at: Option<OffsetDateTime>,
    pub paid_at: Option<OffsetDateTime>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Invoice {
    /// Returns true if the invoice is payable and its due date has passed.
    #[must_use]
    pub fn is_past_due(&self, today: Date) -> bool {
        self.status.is_payable() && self.status != InvoiceStatus::Overdue && today > self.due_date
    }
}

/// A persisted invoice line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLineItem {
    pub id: i64,
    pub invoice_id: i64,
    pub line: PricedLineItem,
}

/// An invoice that has been priced but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub provider_id: i64,
    pub participant_id: i64,
    pub bill_to_type: BillToType,
    pub plan_manager_id: Option<String>,
    pub totals: InvoiceTotals,
    pub invoice_date: OffsetDateTime,
    pub due_date: Date,
    pub notes: Option<String>,
    pub lines: Vec<PricedLineItem>,
}
