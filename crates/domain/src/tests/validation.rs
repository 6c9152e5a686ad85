// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, validate_business_name, validate_service_offering, validate_user_fields};
use rust_decimal::Decimal;

#[test]
fn test_validate_user_fields_accepts_valid_user() {
    assert!(validate_user_fields("pat@example.com", "Pat Example").is_ok());
}

#[test]
fn test_validate_user_fields_rejects_bad_email() {
    for email in ["", "pat", "@example.com", "pat@localhost"] {
        let result = validate_user_fields(email, "Pat");
        assert!(
            matches!(result, Err(DomainError::InvalidField { field: "email", .. })),
            "accepted {email}"
        );
    }
}

#[test]
fn test_validate_user_fields_rejects_blank_name() {
    let result = validate_user_fields("pat@example.com", "   ");
    assert!(matches!(
        result,
        Err(DomainError::InvalidField {
            field: "display_name",
            ..
        })
    ));
}

#[test]
fn test_validate_business_name() {
    assert!(validate_business_name("Care Co").is_ok());
    assert!(validate_business_name("").is_err());
}

#[test]
fn test_validate_service_offering_rejects_negative_rates() {
    assert!(
        validate_service_offering("personal_care", "Morning routine", Some(Decimal::from(50)), None)
            .is_ok()
    );
    let result = validate_service_offering(
        "personal_care",
        "Morning routine",
        None,
        Some(Decimal::from(-1)),
    );
    assert_eq!(
        result,
        Err(DomainError::NegativeAmount {
            field: "weekday_rate",
            amount: Decimal::from(-1),
        })
    );
}

#[test]
fn test_validate_service_offering_requires_name() {
    assert!(validate_service_offering("personal_care", "", None, None).is_err());
}
