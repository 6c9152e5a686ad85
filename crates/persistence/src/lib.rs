// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the NDIS service marketplace.
//!
//! This crate stores the directory, bookings, invoices, payments, and
//! payouts in `SQLite` through Diesel. The schema is embedded from
//! `migrations/` and applied on open.
//!
//! ## Transitions
//!
//! Every status transition is written with its history row inside one
//! transaction. Booking rows carry a `version` column; an update made from a
//! stale copy affects zero rows and fails with
//! [`PersistenceError::ConcurrentModification`]. Invoice and payment updates
//! are conditional on the status the caller read.
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] gives each caller an isolated shared-cache
//! in-memory database, so tests never observe each other's rows.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use ndis_market::{BookingDraft, BookingTransition, InvoiceDraft, InvoiceTransition};
use ndis_market_audit::StatusHistoryEntry;
use ndis_market_domain::{
    Booking, BookingStatus, CheckInRecord, Invoice, InvoiceLineItem, InvoiceStatus,
    ParticipantProfile, Payment, PaymentStatus, ProviderPayout, ProviderProfile, ProviderService,
    RefundOutcome, User, UserStatus,
};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, OffsetDateTime};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    BookingFilter, InvoiceFilter, NewParticipantProfile, NewPayment, NewProviderProfile,
    NewProviderService, NewUser, PayoutCandidate, RefundRecord,
};
pub use error::PersistenceError;

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a persistence adapter over a fresh in-memory database.
    ///
    /// Each call receives a unique database instance via an atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:marketdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter over a file-based database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Directory
    // ========================================================================

    /// Registers a user and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` if the email is taken.
    pub fn insert_user(&mut self, user: &NewUser) -> Result<i64, PersistenceError> {
        mutations::directory::insert_user(&mut self.conn, user)
    }

    /// Sets a user's account status.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the user does not exist.
    pub fn set_user_status(
        &mut self,
        user_id: i64,
        status: UserStatus,
    ) -> Result<(), PersistenceError> {
        mutations::directory::set_user_status(&mut self.conn, user_id, status)
    }

    /// Retrieves a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&mut self, user_id: i64) -> Result<Option<User>, PersistenceError> {
        queries::directory::get_user(&mut self.conn, user_id)
    }

    /// Creates a participant profile and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` if the user already has one.
    pub fn insert_participant(
        &mut self,
        profile: &NewParticipantProfile,
    ) -> Result<i64, PersistenceError> {
        mutations::directory::insert_participant(&mut self.conn, profile)
    }

    /// Retrieves a participant profile by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_participant(
        &mut self,
        participant_id: i64,
    ) -> Result<Option<ParticipantProfile>, PersistenceError> {
        queries::directory::get_participant(&mut self.conn, participant_id)
    }

    /// Retrieves the participant profile owned by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_participant_by_user(
        &mut self,
        user_id: i64,
    ) -> Result<Option<ParticipantProfile>, PersistenceError> {
        queries::directory::get_participant_by_user(&mut self.conn, user_id)
    }

    /// Creates a provider profile and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` if the user already has one.
    pub fn insert_provider(
        &mut self,
        profile: &NewProviderProfile,
    ) -> Result<i64, PersistenceError> {
        mutations::directory::insert_provider(&mut self.conn, profile)
    }

    /// Retrieves a provider profile by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_provider(
        &mut self,
        provider_id: i64,
    ) -> Result<Option<ProviderProfile>, PersistenceError> {
        queries::directory::get_provider(&mut self.conn, provider_id)
    }

    /// Retrieves the provider profile owned by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_provider_by_user(
        &mut self,
        user_id: i64,
    ) -> Result<Option<ProviderProfile>, PersistenceError> {
        queries::directory::get_provider_by_user(&mut self.conn, user_id)
    }

    /// Adds a service to a provider's catalogue and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider does not exist.
    pub fn insert_provider_service(
        &mut self,
        service: &NewProviderService,
    ) -> Result<i64, PersistenceError> {
        mutations::directory::insert_provider_service(&mut self.conn, service)
    }

    /// Retrieves a provider service by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_provider_service(
        &mut self,
        service_id: i64,
    ) -> Result<Option<ProviderService>, PersistenceError> {
        queries::directory::get_provider_service(&mut self.conn, service_id)
    }

    /// Lists a provider's services.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_provider_services(
        &mut self,
        provider_id: i64,
    ) -> Result<Vec<ProviderService>, PersistenceError> {
        queries::directory::list_provider_services(&mut self.conn, provider_id)
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Inserts a drafted booking with its creation history row.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` if the booking number is
    /// taken.
    pub fn insert_booking(&mut self, draft: &BookingDraft) -> Result<Booking, PersistenceError> {
        mutations::bookings::insert_booking(&mut self.conn, draft)
    }

    /// Retrieves a booking by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_booking(&mut self, booking_id: i64) -> Result<Option<Booking>, PersistenceError> {
        queries::bookings::get_booking(&mut self.conn, booking_id)
    }

    /// Lists bookings matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_bookings(
        &mut self,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::list_bookings(&mut self.conn, filter)
    }

    /// Writes a booking transition computed from the version the caller read.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ConcurrentModification` if the booking
    /// changed since it was read.
    pub fn persist_booking_transition(
        &mut self,
        expected_version: i64,
        transition: &BookingTransition,
    ) -> Result<Booking, PersistenceError> {
        mutations::bookings::persist_booking_transition(
            &mut self.conn,
            expected_version,
            transition,
        )
    }

    /// Returns a booking's status history.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn booking_history(
        &mut self,
        booking_id: i64,
    ) -> Result<Vec<StatusHistoryEntry<BookingStatus>>, PersistenceError> {
        queries::bookings::booking_history(&mut self.conn, booking_id)
    }

    /// Returns a booking's GPS check-in and check-out records.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_check_ins(
        &mut self,
        booking_id: i64,
    ) -> Result<Vec<CheckInRecord>, PersistenceError> {
        queries::bookings::list_check_ins(&mut self.conn, booking_id)
    }

    // ========================================================================
    // Invoices
    // ========================================================================

    /// Counts a provider's invoices dated in the month of `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_provider_invoices_in_month(
        &mut self,
        provider_id: i64,
        date: Date,
    ) -> Result<i64, PersistenceError> {
        queries::invoices::count_provider_invoices_in_month(&mut self.conn, provider_id, date)
    }

    /// Returns true if an invoice line item already bills the booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn is_booking_invoiced(&mut self, booking_id: i64) -> Result<bool, PersistenceError> {
        queries::invoices::is_booking_invoiced(&mut self.conn, booking_id)
    }

    /// Inserts a drafted invoice with its line items and history row.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` on an invoice number
    /// collision, or `PersistenceError::BookingAlreadyInvoiced` if a line
    /// bills an invoiced booking.
    pub fn insert_invoice(&mut self, draft: &InvoiceDraft) -> Result<Invoice, PersistenceError> {
        mutations::invoices::insert_invoice(&mut self.conn, draft)
    }

    /// Retrieves an invoice by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_invoice(&mut self, invoice_id: i64) -> Result<Option<Invoice>, PersistenceError> {
        queries::invoices::get_invoice(&mut self.conn, invoice_id)
    }

    /// Returns an invoice's line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_invoice_lines(
        &mut self,
        invoice_id: i64,
    ) -> Result<Vec<InvoiceLineItem>, PersistenceError> {
        queries::invoices::get_invoice_lines(&mut self.conn, invoice_id)
    }

    /// Lists invoices matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_invoices(
        &mut self,
        filter: &InvoiceFilter,
    ) -> Result<Vec<Invoice>, PersistenceError> {
        queries::invoices::list_invoices(&mut self.conn, filter)
    }

    /// Returns payable invoices past their due date that are not yet overdue.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_overdue_candidates(
        &mut self,
        today: Date,
    ) -> Result<Vec<Invoice>, PersistenceError> {
        queries::invoices::list_overdue_candidates(&mut self.conn, today)
    }

    /// Writes an invoice transition computed from the status the caller read.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ConcurrentModification` if the status moved.
    pub fn persist_invoice_transition(
        &mut self,
        expected_status: InvoiceStatus,
        transition: &InvoiceTransition,
    ) -> Result<Invoice, PersistenceError> {
        mutations::invoices::persist_invoice_transition(
            &mut self.conn,
            expected_status,
            transition,
        )
    }

    /// Returns an invoice's status history.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn invoice_history(
        &mut self,
        invoice_id: i64,
    ) -> Result<Vec<StatusHistoryEntry<InvoiceStatus>>, PersistenceError> {
        queries::invoices::invoice_history(&mut self.conn, invoice_id)
    }

    // ========================================================================
    // Payments & payouts
    // ========================================================================

    /// Records a pending payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_payment(&mut self, payment: &NewPayment) -> Result<Payment, PersistenceError> {
        mutations::payments::insert_payment(&mut self.conn, payment)
    }

    /// Retrieves a payment by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_payment(&mut self, payment_id: i64) -> Result<Option<Payment>, PersistenceError> {
        queries::payments::get_payment(&mut self.conn, payment_id)
    }

    /// Lists an invoice's payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_payments(&mut self, invoice_id: i64) -> Result<Vec<Payment>, PersistenceError> {
        queries::payments::list_payments(&mut self.conn, invoice_id)
    }

    /// Sums the captured payments on an invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn paid_total(&mut self, invoice_id: i64) -> Result<Decimal, PersistenceError> {
        queries::payments::paid_total(&mut self.conn, invoice_id)
    }

    /// Completes a pending payment and applies the invoice settlement.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ConcurrentModification` if the payment is
    /// no longer pending or the invoice status moved.
    pub fn complete_payment(
        &mut self,
        payment_id: i64,
        completed_at: OffsetDateTime,
        settlement: Option<(InvoiceStatus, &InvoiceTransition)>,
    ) -> Result<Payment, PersistenceError> {
        mutations::payments::complete_payment(&mut self.conn, payment_id, completed_at, settlement)
    }

    /// Applies a planned refund.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ConcurrentModification` if the payment
    /// status moved.
    pub fn record_refund(
        &mut self,
        expected_status: PaymentStatus,
        outcome: &RefundOutcome,
        refund: &RefundRecord,
    ) -> Result<Payment, PersistenceError> {
        mutations::payments::record_refund(&mut self.conn, expected_status, outcome, refund)
    }

    /// Returns the provider's paid invoices awaiting payout.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn payout_candidates(
        &mut self,
        provider_id: i64,
    ) -> Result<Vec<PayoutCandidate>, PersistenceError> {
        queries::payments::payout_candidates(&mut self.conn, provider_id)
    }

    /// Records a payout and claims its invoices.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ConcurrentModification` if an invoice was
    /// claimed by another batch.
    pub fn create_payout(
        &mut self,
        provider_id: i64,
        candidates: &[PayoutCandidate],
        amount: Decimal,
        transfer_reference: &str,
        created_at: OffsetDateTime,
    ) -> Result<ProviderPayout, PersistenceError> {
        mutations::payments::create_payout(
            &mut self.conn,
            provider_id,
            candidates,
            amount,
            transfer_reference,
            created_at,
        )
    }

    /// Lists a provider's payouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_payouts(
        &mut self,
        provider_id: i64,
    ) -> Result<Vec<ProviderPayout>, PersistenceError> {
        queries::payments::list_payouts(&mut self.conn, provider_id)
    }
}
