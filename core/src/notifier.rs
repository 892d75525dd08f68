//! Post-confirmation customer notification boundary.
//!
//! After the transaction commits, a confirmation message is sent to the
//! customer best-effort. The booking is already durably confirmed by then;
//! a notifier failure is logged by the caller and never changes the reported
//! outcome of the confirmation itself.

use crate::types::BookingId;
use chrono::NaiveDate;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors from sending a confirmation message.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Recipient address could not be parsed.
    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),

    /// Transport-level failure (SMTP connection, relay rejection, ...).
    #[error("email transport error: {0}")]
    Transport(String),
}

/// The message composed from a freshly confirmed booking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationEmail {
    /// Recipient email address.
    pub to: String,
    /// Customer display name.
    pub customer_name: String,
    /// Resolved hotel display name.
    pub hotel_name: String,
    /// Confirmed booking.
    pub booking_id: BookingId,
    /// Stay start.
    pub check_in: NaiveDate,
    /// Stay end.
    pub check_out: NaiveDate,
}

/// Notification sender.
///
/// Uses `Pin<Box<dyn Future>>` returns for trait-object usage
/// (`Arc<dyn ConfirmationNotifier>` injected into handlers).
pub trait ConfirmationNotifier: Send + Sync {
    /// Send a booking confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the message could not be handed to the
    /// transport. Callers log this and move on; they must not fail the
    /// confirmation over it.
    fn send_confirmation(
        &self,
        email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + '_>>;
}
