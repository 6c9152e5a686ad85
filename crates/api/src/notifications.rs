// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Best-effort email and SMS notifications.
//!
//! The dispatcher turns marketplace events into messages and hands them to
//! a `NotificationChannel`. Delivery failures are logged and swallowed; a
//! notification never undoes the mutation that triggered it.

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use time::Date;
use tracing::{debug, warn};

/// Notification delivery errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The channel refused the message.
    #[error("Notification channel rejected the message: {reason}")]
    Rejected { reason: String },

    /// The recorder's lock was poisoned by a panicking writer.
    #[error("Notification recorder is unavailable")]
    RecorderPoisoned,
}

/// The medium a message went out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Email,
    Sms,
}

/// Proof that a channel accepted a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub id: String,
    pub channel: ChannelKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

/// Any message a channel has been asked to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentNotification {
    Email(EmailMessage),
    Sms(SmsMessage),
}

/// A delivery mechanism for notifications.
pub trait NotificationChannel: Send + Sync {
    /// Sends an email.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be accepted.
    fn send_email(&self, message: &EmailMessage) -> Result<DeliveryReceipt, NotificationError>;

    /// Sends an SMS.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be accepted.
    fn send_sms(&self, message: &SmsMessage) -> Result<DeliveryReceipt, NotificationError>;
}

/// Channel that drops every message after logging it.
#[derive(Debug, Default)]
pub struct NoopChannel {
    counter: AtomicU64,
}

impl NoopChannel {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    fn receipt(&self, channel: ChannelKind) -> DeliveryReceipt {
        let n: u64 = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        DeliveryReceipt {
            id: format!("noop_{n}"),
            channel,
        }
    }
}

impl NotificationChannel for NoopChannel {
    fn send_email(&self, message: &EmailMessage) -> Result<DeliveryReceipt, NotificationError> {
        debug!(to = %message.to, subject = %message.subject, "Email notification dropped");
        Ok(self.receipt(ChannelKind::Email))
    }

    fn send_sms(&self, message: &SmsMessage) -> Result<DeliveryReceipt, NotificationError> {
        debug!(to = %message.to, "SMS notification dropped");
        Ok(self.receipt(ChannelKind::Sms))
    }
}

/// Channel that keeps every message for later inspection.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    sent: Arc<Mutex<Vec<SentNotification>>>,
}

impl RecordingChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Returns the recorded emails addressed to `to`.
    #[must_use]
    pub fn emails_to(&self, to: &str) -> Vec<EmailMessage> {
        self.sent()
            .into_iter()
            .filter_map(|n| match n {
                SentNotification::Email(email) if email.to == to => Some(email),
                _ => None,
            })
            .collect()
    }

    fn record(
        &self,
        notification: SentNotification,
        channel: ChannelKind,
    ) -> Result<DeliveryReceipt, NotificationError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| NotificationError::RecorderPoisoned)?;
        sent.push(notification);
        Ok(DeliveryReceipt {
            id: format!("rec_{}", sent.len()),
            channel,
        })
    }
}

impl NotificationChannel for RecordingChannel {
    fn send_email(&self, message: &EmailMessage) -> Result<DeliveryReceipt, NotificationError> {
        self.record(SentNotification::Email(message.clone()), ChannelKind::Email)
    }

    fn send_sms(&self, message: &SmsMessage) -> Result<DeliveryReceipt, NotificationError> {
        self.record(SentNotification::Sms(message.clone()), ChannelKind::Sms)
    }
}

/// Something worth telling a marketplace user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    BookingRequested {
        booking_number: String,
        service_type: String,
        scheduled_date: Date,
    },
    BookingAccepted {
        booking_number: String,
    },
    BookingDeclined {
        booking_number: String,
        reason: Option<String>,
    },
    ConfirmationRequested {
        booking_number: String,
    },
    BookingCompleted {
        booking_number: String,
    },
    BookingCancelled {
        booking_number: String,
        reason: Option<String>,
    },
    InvoiceSent {
        invoice_number: String,
        total_amount: Decimal,
        due_date: Date,
    },
    PaymentReceived {
        invoice_number: String,
        amount: Decimal,
    },
    PayoutSent {
        amount: Decimal,
        invoice_count: usize,
    },
}

impl MarketEvent {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BookingRequested { .. } => "booking_requested",
            Self::BookingAccepted { .. } => "booking_accepted",
            Self::BookingDeclined { .. } => "booking_declined",
            Self::ConfirmationRequested { .. } => "confirmation_requested",
            Self::BookingCompleted { .. } => "booking_completed",
            Self::BookingCancelled { .. } => "booking_cancelled",
            Self::InvoiceSent { .. } => "invoice_sent",
            Self::PaymentReceived { .. } => "payment_received",
            Self::PayoutSent { .. } => "payout_sent",
        }
    }

    /// Renders the email subject and body.
    #[must_use]
    pub fn render(&self) -> (String, String) {
        match self {
            Self::BookingRequested {
                booking_number,
                service_type,
                scheduled_date,
            } => (
                format!("New booking request {booking_number}"),
                format!(
                    "You have a new {service_type} booking request for {scheduled_date}. \
                     Please accept or decline within 24 hours."
                ),
            ),
            Self::BookingAccepted { booking_number } => (
                format!("Booking {booking_number} accepted"),
                String::from("Your provider has accepted the booking."),
            ),
            Self::BookingDeclined {
                booking_number,
                reason,
            } => (
                format!("Booking {booking_number} declined"),
                reason.as_ref().map_or_else(
                    || String::from("Your provider has declined the booking."),
                    |r| format!("Your provider has declined the booking: {r}"),
                ),
            ),
            Self::ConfirmationRequested { booking_number } => (
                format!("Please confirm booking {booking_number}"),
                String::from("The service has finished. Please confirm it was delivered."),
            ),
            Self::BookingCompleted { booking_number } => (
                format!("Booking {booking_number} completed"),
                String::from("Both parties have confirmed the service."),
            ),
            Self::BookingCancelled {
                booking_number,
                reason,
            } => (
                format!("Booking {booking_number} cancelled"),
                reason.as_ref().map_or_else(
                    || String::from("The booking has been cancelled."),
                    |r| format!("The booking has been cancelled: {r}"),
                ),
            ),
            Self::InvoiceSent {
                invoice_number,
                total_amount,
                due_date,
            } => (
                format!("Invoice {invoice_number}"),
                format!("An invoice for ${total_amount} is due on {due_date}."),
            ),
            Self::PaymentReceived {
                invoice_number,
                amount,
            } => (
                format!("Payment received for {invoice_number}"),
                format!("A payment of ${amount} has been received."),
            ),
            Self::PayoutSent {
                amount,
                invoice_count,
            } => (
                String::from("Payout on its way"),
                format!("A payout of ${amount} covering {invoice_count} invoice(s) has been sent."),
            ),
        }
    }
}

/// Where to reach a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub phone: Option<String>,
}

/// Routes marketplace events to a channel.
#[derive(Clone)]
pub struct NotificationDispatcher {
    channel: Arc<dyn NotificationChannel>,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher").finish_non_exhaustive()
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(NoopChannel::new()))
    }
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self { channel }
    }

    /// Emails the recipient, and texts them if a phone number is on file.
    ///
    /// Returns the receipts of the deliveries that succeeded.
    #[must_use]
    pub fn dispatch(&self, event: &MarketEvent, recipient: &Recipient) -> Vec<DeliveryReceipt> {
        let (subject, body): (String, String) = event.render();
        let mut receipts: Vec<DeliveryReceipt> = Vec::with_capacity(2);

        let email: EmailMessage = EmailMessage {
            to: recipient.email.clone(),
            subject: subject.clone(),
            body,
        };
        match self.channel.send_email(&email) {
            Ok(receipt) => receipts.push(receipt),
            Err(e) => warn!(
                event = event.name(),
                to = %email.to,
                error = %e,
                "Email notification failed"
            ),
        }

        if let Some(phone) = &recipient.phone {
            let sms: SmsMessage = SmsMessage {
                to: phone.clone(),
                body: subject,
            };
            match self.channel.send_sms(&sms) {
                Ok(receipt) => receipts.push(receipt),
                Err(e) => warn!(
                    event = event.name(),
                    to = %sms.to,
                    error = %e,
                    "SMS notification failed"
                ),
            }
        }

        receipts
    }
}
