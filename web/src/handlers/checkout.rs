//! Browser checkout-completion endpoint.
//!
//! `POST /api/payments/confirm` - invoked by the frontend right after the
//! gateway's checkout flow hands the browser a payment handle. The payload
//! carries the gateway's redirect triple (`order_id`, `payment_id`,
//! `signature`) plus the original booking context.
//!
//! This path races freely against the webhook for the same booking; both
//! converge on the same transaction and the loser observes the
//! already-confirmed state.

use axum::{Json, extract::State};
use roomledger_core::{
    BookingId, BookingStatus, ConfirmationEmail, ConfirmationRequest, HotelId, OrderId, PaymentId,
    RoomId, UserId,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::notify::{resolve_hotel_name, spawn_confirmation_notice};
use crate::state::AppState;

/// Request body from the frontend checkout handler.
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    /// Gateway order id created when checkout began
    pub razorpay_order_id: String,
    /// Gateway payment id handed to the browser on capture
    pub razorpay_payment_id: String,
    /// Gateway signature over `"{order_id}|{payment_id}"`
    pub razorpay_signature: String,
    /// Owner of the booking
    pub user_id: String,
    /// Booking to confirm
    pub booking_id: String,
    /// Hotel owning the room inventory
    pub hotel_id: String,
    /// Room type backing the booking
    pub room_id: String,
}

/// Response body on success (including the idempotent no-op case).
#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    /// Confirmed booking id
    pub booking_id: BookingId,
    /// Final status (always `CONFIRMED`)
    pub status: BookingStatus,
    /// Recorded gateway payment id
    pub payment_id: Option<PaymentId>,
    /// Message for the user
    pub message: &'static str,
}

/// Confirm a booking from the browser checkout callback.
///
/// # Errors
///
/// `400` on signature failure, `404` on missing booking/room, `409` on
/// invalid state or exhausted inventory, `5xx` on transient failures.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, AppError> {
    let order_id = OrderId::new(request.razorpay_order_id);
    let payment_id = PaymentId::new(request.razorpay_payment_id);

    state
        .verifier
        .verify_checkout(&order_id, &payment_id, &request.razorpay_signature)?;

    let confirmation = ConfirmationRequest {
        user_id: UserId::new(request.user_id),
        booking_id: BookingId::new(request.booking_id),
        hotel_id: HotelId::new(request.hotel_id),
        room_id: RoomId::new(request.room_id),
        payment_id,
    };

    let outcome = state.confirmations.confirm(&confirmation).await?;

    if outcome.newly_confirmed {
        let hotel_name = resolve_hotel_name(&state.store, &confirmation.hotel_id).await;
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
    }

    Ok(Json(ConfirmPaymentResponse {
        booking_id: outcome.booking.booking_id,
        status: outcome.booking.status,
        payment_id: outcome.booking.payment_id,
        message: "Your booking is confirmed.",
    }))
}
