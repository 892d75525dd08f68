//! Payment gateway webhook endpoint.
//!
//! `POST /webhooks/razorpay` - the asynchronous server-to-server signal that
//! a payment was captured. The gateway redelivers on non-2xx responses, so
//! status codes encode retry semantics:
//!
//! - `200`: handled, stop redelivering. This includes outcomes that are
//!   rejections of the event itself (booking missing, notes missing,
//!   overbooking): the event was authentic and well-formed, redelivering it
//!   cannot change the outcome. Each such case is logged for operators.
//! - `400`: bad or missing signature, unparseable body. Not from the
//!   gateway, or corrupted in transit; no transaction was attempted.
//! - `5xx`: configuration or transient store failure; redelivery may
//!   succeed.
//!
//! Verification runs on the exact raw body bytes, before any JSON parsing.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use roomledger_core::{
    BookingId, ConfirmationEmail, ConfirmationError, ConfirmationRequest, HotelId, PaymentId,
    RoomId, UserId,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::notify::{resolve_hotel_name, spawn_confirmation_notice};
use crate::state::AppState;

/// Header carrying the gateway's HMAC-SHA256 hex digest of the body.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Event name that triggers the confirmation transaction.
const PAYMENT_CAPTURED: &str = "payment.captured";

/// Webhook envelope: an event name plus the payment entity.
#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    event: String,
    #[serde(default)]
    payload: Option<EventPayload>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    payment: Option<PaymentWrapper>,
}

#[derive(Debug, Deserialize)]
struct PaymentWrapper {
    entity: PaymentEntity,
}

/// The payment entity as reported by the gateway. `notes` is an arbitrary
/// key-value bag set at order creation; it is untrusted input and every
/// field is validated for presence and shape before use.
#[derive(Debug, Deserialize)]
struct PaymentEntity {
    id: String,
    #[serde(default)]
    notes: serde_json::Map<String, serde_json::Value>,
}

/// Acknowledgment body returned to the gateway.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// Outcome marker; any 200 stops redelivery regardless of the value.
    pub status: &'static str,
}

fn ack(status: &'static str) -> Json<WebhookAck> {
    Json(WebhookAck { status })
}

fn note(notes: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    notes.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Handle a payment webhook delivery.
///
/// # Errors
///
/// Returns `AppError` for signature/body rejections (400) and for
/// configuration or transient failures (5xx, prompting redelivery).
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::bad_request("missing payment signature header"))?;

    if let Err(err) = state.verifier.verify_webhook(&body, signature) {
        tracing::warn!(error = %err, "webhook signature rejected");
        return Err(AppError::bad_request("invalid payment signature"));
    }

    let envelope: WebhookEnvelope = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("unparseable webhook body: {e}")))?;

    if envelope.event != PAYMENT_CAPTURED {
        tracing::debug!(event = %envelope.event, "ignoring webhook event");
        return Ok(ack("ignored"));
    }

    let payment = envelope
        .payload
        .and_then(|p| p.payment)
        .ok_or_else(|| AppError::bad_request("captured event without payment entity"))?
        .entity;
    let payment_id = PaymentId::new(payment.id);

    // The notes bag is how the checkout flow smuggles the booking context
    // through the gateway. A captured payment without it can never be
    // matched to a booking: acknowledged so the gateway stops redelivering,
    // but logged loudly because it means money was taken for a booking this
    // service cannot confirm.
    let (Some(user_id), Some(booking_id), Some(hotel_id), Some(room_id)) = (
        note(&payment.notes, "user_id"),
        note(&payment.notes, "booking_id"),
        note(&payment.notes, "hotel_id"),
        note(&payment.notes, "room_id"),
    ) else {
        tracing::error!(
            payment_id = %payment_id,
            "captured payment is missing booking context notes; manual reconciliation required"
        );
        return Ok(ack("acknowledged"));
    };

    let request = ConfirmationRequest {
        user_id: UserId::new(user_id),
        booking_id: BookingId::new(booking_id),
        hotel_id: HotelId::new(hotel_id),
        room_id: RoomId::new(room_id),
        payment_id,
    };

    match state.confirmations.confirm(&request).await {
        Ok(outcome) => {
            if outcome.newly_confirmed {
                let hotel_name = resolve_hotel_name(&state.store, &request.hotel_id).await;
                spawn_confirmation_notice(
                    state.notifier.clone(),
                    ConfirmationEmail {
                        to: outcome.booking.customer_email.clone(),
                        customer_name: outcome.booking.customer_name.clone(),
                        hotel_name,
                        booking_id: outcome.booking.booking_id.clone(),
                        check_in: outcome.booking.check_in,
                        check_out: outcome.booking.check_out,
                    },
                );
                Ok(ack("ok"))
            } else {
                Ok(ack("already-confirmed"))
            }
        }
        // Authentic event, but redelivery can never fix these: ack, log.
        Err(err @ (ConfirmationError::BookingNotFound { .. }
        | ConfirmationError::RoomNotFound { .. }
        | ConfirmationError::InvalidState { .. })) => {
            tracing::error!(
                booking_id = %request.booking_id,
                payment_id = %request.payment_id,
                error = %err,
                "webhook references state that cannot be confirmed; manual investigation required"
            );
            Ok(ack("acknowledged"))
        }
        Err(err @ ConfirmationError::InventoryExhausted { .. }) => {
            tracing::error!(
                booking_id = %request.booking_id,
                payment_id = %request.payment_id,
                error = %err,
                "overbooking detected; payment needs compensating refund"
            );
            Ok(ack("overbooking-detected"))
        }
        // 5xx via the standard mapping; the gateway redelivers.
        Err(err) => Err(err.into()),
    }
}
