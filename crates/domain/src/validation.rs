// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::money::ensure_non_negative;
use rust_decimal::Decimal;

/// Validates a user's registration fields.
///
/// This checks shape only. Email uniqueness is enforced by persistence.
///
/// # Errors
///
/// Returns an error if:
/// - The email is empty or lacks an `@` with text on both sides
/// - The display name is empty
pub fn validate_user_fields(email: &str, display_name: &str) -> Result<(), DomainError> {
    // Rule: email must look like local@domain
    let valid_email: bool = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(DomainError::InvalidField {
            field: "email",
            reason: format!("'{email}' is not an email address"),
        });
    }

    // Rule: display name must not be blank
    if display_name.trim().is_empty() {
        return Err(DomainError::InvalidField {
            field: "display_name",
            reason: String::from("Display name cannot be empty"),
        });
    }

    Ok(())
}

/// Validates a provider's business name.
///
/// # Errors
///
/// Returns an error if the name is blank.
pub fn validate_business_name(business_name: &str) -> Result<(), DomainError> {
    if business_name.trim().is_empty() {
        return Err(DomainError::InvalidField {
            field: "business_name",
            reason: String::from("Business name cannot be empty"),
        });
    }
    Ok(())
}

/// Validates a provider service offering.
///
/// # Errors
///
/// Returns an error if:
/// - The service type or name is blank
/// - Either rate is negative
pub fn validate_service_offering(
    service_type: &str,
    name: &str,
    base_rate: Option<Decimal>,
    weekday_rate: Option<Decimal>,
) -> Result<(), DomainError> {
    if service_type.trim().is_empty() {
        return Err(DomainError::InvalidField {
            field: "service_type",
            reason: String::from("Service type cannot be empty"),
        });
    }
    if name.trim().is_empty() {
        return Err(DomainError::InvalidField {
            field: "name",
            reason: String::from("Service name cannot be empty"),
        });
    }
    if let Some(rate) = base_rate {
        ensure_non_negative("base_rate", rate)?;
    }
    if let Some(rate) = weekday_rate {
        ensure_non_negative("weekday_rate", rate)?;
    }
    Ok(())
}
