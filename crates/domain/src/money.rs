// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Money and quantity rounding.
//!
//! Money is carried as `Decimal` and rounded to cents after every
//! multiplication. Hours keep four decimal places so minute-level
//! durations stay exact enough to price.

use crate::error::DomainError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Decimal places kept on money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places kept on hour quantities.
pub const HOURS_SCALE: u32 = 4;

/// Rounds a money amount to cents, midpoint away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an hour quantity to four decimal places.
#[must_use]
pub fn round_hours(hours: Decimal) -> Decimal {
    hours.round_dp_with_strategy(HOURS_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a stored money string.
///
/// # Errors
///
/// Returns `DomainError::InvalidMoney` if the text is not a decimal number.
pub fn parse_money(value: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(value.trim()).map_err(|_| DomainError::InvalidMoney {
        value: value.to_string(),
    })
}

/// Rejects negative amounts.
///
/// # Errors
///
/// Returns `DomainError::NegativeAmount` naming `field` if `amount < 0`.
pub fn ensure_non_negative(field: &'static str, amount: Decimal) -> Result<Decimal, DomainError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::NegativeAmount { field, amount });
    }
    Ok(amount)
}
