// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Every status transition writes the aggregate row and its history row in
//! one transaction. Inserts read the assigned id back through
//! `PersistenceBackend::get_last_insert_rowid`.
//!
//! - `directory`: users, profiles, services
//! - `bookings`: booking creation and transitions
//! - `invoices`: invoice creation and transitions
//! - `payments`: payments, refunds, payout batches

pub mod bookings;
pub mod directory;
pub mod invoices;
pub mod payments;
