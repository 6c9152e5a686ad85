// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `directory`: users, participant and provider profiles, services
//! - `bookings`: bookings, check-ins, booking status history
//! - `invoices`: invoices, line items, invoice status history
//! - `payments`: payments and provider payouts

pub mod bookings;
pub mod directory;
pub mod invoices;
pub mod payments;
