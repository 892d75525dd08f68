//! Confirmation email delivery.
//!
//! Two `ConfirmationNotifier` implementations:
//!
//! - `SmtpNotifier`: production sender over an SMTP relay (lettre)
//! - `ConsoleNotifier`: prints the message to the log for development
//!
//! Plus the fire-and-forget dispatch helper used by the handlers: the
//! booking is durably confirmed before any of this runs, so delivery
//! failures are logged and swallowed, never surfaced as the operation's
//! failure.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use roomledger_core::{
    ConfirmationEmail, ConfirmationNotifier, DocumentPath, DocumentStore, HotelId, NotifyError,
};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::SmtpConfig;

/// SMTP-backed confirmation sender.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a notifier from SMTP configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Transport` if the relay address or sender
    /// mailbox cannot be parsed.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.relay)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        let from = config
            .from
            .parse()
            .map_err(|_| NotifyError::Transport(format!("invalid sender mailbox {}", config.from)))?;
        Ok(Self { transport, from })
    }

    fn compose(&self, email: &ConfirmationEmail) -> Result<Message, NotifyError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| NotifyError::InvalidRecipient(email.to.clone()))?;
        let body = format!(
            "Dear {name},\n\n\
             Your booking at {hotel} is confirmed.\n\n\
             Booking reference: {booking}\n\
             Check-in:  {check_in}\n\
             Check-out: {check_out}\n\n\
             We look forward to hosting you.\n",
            name = email.customer_name,
            hotel = email.hotel_name,
            booking = email.booking_id,
            check_in = email.check_in,
            check_out = email.check_out,
        );
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("Booking confirmed - {}", email.hotel_name))
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }
}

impl ConfirmationNotifier for SmtpNotifier {
    fn send_confirmation(
        &self,
        email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + '_>> {
        Box::pin(async move {
            let message = self.compose(&email)?;
            self.transport
                .send(message)
                .await
                .map_err(|e| NotifyError::Transport(e.to_string()))?;
            tracing::info!(
                booking_id = %email.booking_id,
                to = %email.to,
                "confirmation email sent"
            );
            Ok(())
        })
    }
}

/// Console confirmation sender for development and demos.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create the console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ConfirmationNotifier for ConsoleNotifier {
    fn send_confirmation(
        &self,
        email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + '_>> {
        tracing::info!(
            to = %email.to,
            customer = %email.customer_name,
            hotel = %email.hotel_name,
            booking_id = %email.booking_id,
            check_in = %email.check_in,
            check_out = %email.check_out,
            "confirmation email (console)"
        );
        Box::pin(async { Ok(()) })
    }
}

/// Dispatch a confirmation notice without blocking or failing the caller.
///
/// Spawned onto the runtime; the send's outcome only ever reaches the log.
pub fn spawn_confirmation_notice(notifier: Arc<dyn ConfirmationNotifier>, email: ConfirmationEmail) {
    tokio::spawn(async move {
        let booking_id = email.booking_id.clone();
        if let Err(err) = notifier.send_confirmation(email).await {
            tracing::warn!(
                booking_id = %booking_id,
                error = %err,
                "confirmation email failed; booking remains confirmed"
            );
        }
    });
}

/// Shape of the hotel document, of which only the display name matters here.
#[derive(Deserialize)]
struct HotelDocument {
    name: String,
}

/// Resolve a hotel's display name for the confirmation email, best-effort.
///
/// Any failure (missing document, unexpected shape, backend error) falls
/// back to the hotel id; the email is still worth sending.
pub async fn resolve_hotel_name(store: &Arc<dyn DocumentStore>, hotel_id: &HotelId) -> String {
    match store.get(DocumentPath::hotel(hotel_id)).await {
        Ok(Some(doc)) => doc
            .to_typed::<HotelDocument>()
            .map_or_else(|_| hotel_id.to_string(), |hotel| hotel.name),
        Ok(None) => hotel_id.to_string(),
        Err(err) => {
            tracing::debug!(hotel_id = %hotel_id, error = %err, "hotel name lookup failed");
            hotel_id.to_string()
        }
    }
}
