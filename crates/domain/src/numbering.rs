// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Human-readable booking and invoice numbers.
//!
//! Neither format is unique on its own. Uniqueness is enforced by the
//! persistence layer and callers retry with a fresh number on conflict.

use time::Date;

/// Upper bound (exclusive) of the random booking suffix.
const BOOKING_SUFFIX_RANGE: u32 = 10_000;

/// `{YYYY}{MM}` for the given date.
#[must_use]
pub fn year_month(date: Date) -> String {
    format!("{:04}{:02}", date.year(), u8::from(date.month()))
}

/// Formats a booking number: `VC{YYYY}{MM}-{NNNN}`.
#[must_use]
pub fn format_booking_number(date: Date, suffix: u32) -> String {
    format!("VC{}-{:04}", year_month(date), suffix % BOOKING_SUFFIX_RANGE)
}

/// Generates a booking number with a pseudo-random 4-digit suffix.
#[must_use]
pub fn generate_booking_number(date: Date) -> String {
    format_booking_number(date, rand::random::<u32>())
}

/// Formats an invoice number: `INV-{YYYY}{MM}-{seq:04}`.
#[must_use]
pub fn format_invoice_number(date: Date, sequence: u32) -> String {
    format!("INV-{}-{sequence:04}", year_month(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_booking_number_format() {
        assert_eq!(
            format_booking_number(date!(2026 - 03 - 02), 42),
            "VC202603-0042"
        );
        assert_eq!(
            format_booking_number(date!(2026 - 11 - 30), 123_456),
            "VC202611-3456"
        );
    }

    #[test]
    fn test_generated_booking_number_shape() {
        let number = generate_booking_number(date!(2026 - 03 - 02));
        assert!(number.starts_with("VC202603-"));
        assert_eq!(number.len(), "VC202603-0000".len());
        assert!(number[9..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_invoice_number_format() {
        assert_eq!(
            format_invoice_number(date!(2026 - 01 - 15), 1),
            "INV-202601-0001"
        );
        assert_eq!(
            format_invoice_number(date!(2026 - 12 - 01), 27),
            "INV-202612-0027"
        );
    }
}
