// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::gateway::GatewayError;
use ndis_market::CoreError;
use ndis_market_domain::DomainError;
use ndis_market_persistence::PersistenceError;

/// Identity resolution and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request does not identify an active user.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor may not perform the action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why it was refused.
        reason: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Forbidden { action, reason } => {
                write!(f, "Forbidden: cannot {action}: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// Each variant maps to exactly one HTTP status in the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A requested resource was not found.
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The actor is known but may not perform the action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why it was refused.
        reason: String,
    },
    /// The request violates a validation or business rule.
    BadRequest {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The write lost a race or collided with a unique value.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The request does not identify an active user.
    Unauthorized {
        /// The reason authentication failed.
        reason: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Forbidden { action, reason } => {
                write!(f, "Forbidden: cannot {action}: {reason}")
            }
            Self::BadRequest { message, .. } => write!(f, "{message}"),
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Unauthorized { reason } => write!(f, "Unauthorized: {reason}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::Unauthorized { reason },
            AuthError::Forbidden { action, reason } => Self::Forbidden { action, reason },
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self::Internal {
            message: format!("Payment gateway failed: {err}"),
        }
    }
}

impl ApiError {
    /// Shorthand for a missing resource.
    pub(crate) fn not_found(resource_type: &str, id: i64) -> Self {
        Self::NotFound {
            resource_type: resource_type.to_string(),
            message: format!("{resource_type} {id} does not exist"),
        }
    }

    /// Shorthand for a rule violation.
    pub(crate) fn bad_request(rule: &str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// Every domain error is a client mistake except `BookingAlreadyInvoiced`,
/// which is reported the same way, as a rule violation.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let rule: &str = match &err {
        DomainError::InvalidTimeOfDay { .. } => "time_of_day",
        DomainError::NonPositiveDuration { .. } => "positive_duration",
        DomainError::InvalidCoordinates { .. } => "coordinates_in_range",
        DomainError::InvalidEnumValue { .. } => "known_value",
        DomainError::InvalidBookingState { .. } | DomainError::InvalidBookingTransition { .. } => {
            "booking_state"
        }
        DomainError::InvalidInvoiceState { .. } => "invoice_state",
        DomainError::InvalidPaymentState { .. } => "payment_state",
        DomainError::EmptyInvoice => "invoice_has_lines",
        DomainError::InvalidQuantity { .. } => "positive_quantity",
        DomainError::NegativeAmount { .. } | DomainError::InvalidMoney { .. } => "money",
        DomainError::BookingAlreadyInvoiced { .. } => "booking_invoiced_once",
        DomainError::InvalidRefundAmount { .. } => "refund_amount",
        DomainError::EmptyPayoutBatch { .. } => "payout_has_invoices",
        DomainError::InvalidField { .. } => "field",
        DomainError::DateArithmeticOverflow { .. } => "date_range",
    };
    ApiError::BadRequest {
        rule: String::from(rule),
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::UserActorRequired { operation } => ApiError::Forbidden {
            action: String::from(operation),
            reason: String::from("a user must perform this operation"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::UniqueViolation(msg) => ApiError::Conflict { message: msg },
        PersistenceError::ConcurrentModification { entity, id } => ApiError::Conflict {
            message: format!("{entity} {id} was modified by another request"),
        },
        PersistenceError::BookingAlreadyInvoiced { booking_id } => {
            translate_domain_error(DomainError::BookingAlreadyInvoiced { booking_id })
        }
        PersistenceError::NotFound(msg) => ApiError::NotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
