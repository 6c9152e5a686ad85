// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod create;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply_booking, apply_invoice};
pub use command::{BookingCommand, BookingRequest, GpsReading, InvoiceCommand};
pub use create::{InvoiceParties, draft_booking, draft_invoice, line_item_from_booking};
pub use error::CoreError;
pub use state::{BookingDraft, BookingTransition, InvoiceDraft, InvoiceTransition};
