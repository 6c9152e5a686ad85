// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment gateway adapter.
//!
//! Only the mock gateway is implemented. It answers synchronously with
//! deterministic identifiers drawn from a per-instance counter.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable carrying the real gateway credential.
pub const GATEWAY_SECRET_ENV: &str = "PAYMENT_GATEWAY_SECRET_KEY";

/// Payment gateway errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The live gateway integration does not exist.
    #[error("Live payment gateway is not implemented ({operation})")]
    NotImplemented { operation: &'static str },

    /// The gateway rejected the request.
    #[error("Payment gateway rejected the request: {reason}")]
    Rejected { reason: String },
}

/// A created payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
    pub amount: Decimal,
}

/// A refund issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRefund {
    pub refund_id: String,
    pub amount: Decimal,
}

/// A transfer to a provider's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub transfer_id: String,
    pub amount: Decimal,
}

/// Abstraction over the external payment processor.
pub trait PaymentGateway: Send + Sync {
    /// Returns true if this gateway fakes every call.
    fn mock_mode(&self) -> bool;

    /// Creates an intent to collect `amount` for an invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway refuses the intent.
    fn create_intent(&self, invoice_id: i64, amount: Decimal)
    -> Result<PaymentIntent, GatewayError>;

    /// Confirms a previously created intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway cannot capture the funds.
    fn confirm_intent(&self, intent_id: &str) -> Result<(), GatewayError>;

    /// Refunds part or all of a captured intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway refuses the refund.
    fn refund(&self, intent_id: &str, amount: Decimal) -> Result<GatewayRefund, GatewayError>;

    /// Transfers a payout to a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway refuses the transfer.
    fn create_transfer(&self, provider_id: i64, amount: Decimal)
    -> Result<Transfer, GatewayError>;
}

/// Gateway that succeeds immediately with `pi_mock_{n}`, `re_mock_{n}` and
/// `tr_mock_{n}` identifiers.
#[derive(Debug, Default)]
pub struct MockPaymentGateway {
    counter: AtomicU64,
}

impl MockPaymentGateway {
    /// Creates a mock gateway whose counter starts at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn mock_mode(&self) -> bool {
        true
    }

    fn create_intent(
        &self,
        invoice_id: i64,
        amount: Decimal,
    ) -> Result<PaymentIntent, GatewayError> {
        let intent_id: String = format!("pi_mock_{}", self.next_id());
        info!(invoice_id, %amount, intent_id = %intent_id, "Mock payment intent created");
        Ok(PaymentIntent {
            client_secret: format!("{intent_id}_secret_mock"),
            intent_id,
            amount,
        })
    }

    fn confirm_intent(&self, intent_id: &str) -> Result<(), GatewayError> {
        info!(intent_id, "Mock payment intent confirmed");
        Ok(())
    }

    fn refund(&self, intent_id: &str, amount: Decimal) -> Result<GatewayRefund, GatewayError> {
        let refund_id: String = format!("re_mock_{}", self.next_id());
        info!(intent_id, %amount, refund_id = %refund_id, "Mock refund issued");
        Ok(GatewayRefund { refund_id, amount })
    }

    fn create_transfer(&self, provider_id: i64, amount: Decimal) -> Result<Transfer, GatewayError> {
        let transfer_id: String = format!("tr_mock_{}", self.next_id());
        info!(provider_id, %amount, transfer_id = %transfer_id, "Mock transfer created");
        Ok(Transfer {
            transfer_id,
            amount,
        })
    }
}

/// Placeholder for the real processor, selected when a credential is set.
#[derive(Debug)]
pub struct LivePaymentGateway {
    secret_key: String,
}

impl LivePaymentGateway {
    fn unavailable(&self, operation: &'static str) -> GatewayError {
        warn!(
            operation,
            key_len = self.secret_key.len(),
            "Live payment gateway requested but not implemented"
        );
        GatewayError::NotImplemented { operation }
    }
}

impl PaymentGateway for LivePaymentGateway {
    fn mock_mode(&self) -> bool {
        false
    }

    fn create_intent(&self, _: i64, _: Decimal) -> Result<PaymentIntent, GatewayError> {
        Err(self.unavailable("create_intent"))
    }

    fn confirm_intent(&self, _: &str) -> Result<(), GatewayError> {
        Err(self.unavailable("confirm_intent"))
    }

    fn refund(&self, _: &str, _: Decimal) -> Result<GatewayRefund, GatewayError> {
        Err(self.unavailable("refund"))
    }

    fn create_transfer(&self, _: i64, _: Decimal) -> Result<Transfer, GatewayError> {
        Err(self.unavailable("create_transfer"))
    }
}

/// Gateway selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    /// The processor credential. Absent means mock mode.
    pub secret_key: Option<String>,
}

impl GatewayConfig {
    /// Reads the credential from `PAYMENT_GATEWAY_SECRET_KEY`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            secret_key: std::env::var(GATEWAY_SECRET_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty()),
        }
    }

    /// Returns true if no credential is configured.
    #[must_use]
    pub const fn mock_mode(&self) -> bool {
        self.secret_key.is_none()
    }

    /// Builds the configured gateway.
    #[must_use]
    pub fn build(self) -> Arc<dyn PaymentGateway> {
        match self.secret_key {
            None => Arc::new(MockPaymentGateway::new()),
            Some(secret_key) => Arc::new(LivePaymentGateway { secret_key }),
        }
    }
}
