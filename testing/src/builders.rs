//! Fixture builders for bookings and room inventory.
//!
//! Values are deliberately boring and deterministic; tests override what
//! they care about.

use chrono::{DateTime, NaiveDate, Utc};
use roomledger_core::confirmation::ConfirmationRequest;
use roomledger_core::types::{
    Booking, BookingId, BookingStatus, HotelId, PaymentId, RoomId, RoomInventory, UserId,
};

/// Fixed creation timestamp so fixtures compare stably.
#[must_use]
#[allow(clippy::expect_used)]
fn created_at() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
        .expect("hardcoded timestamp should always parse")
        .with_timezone(&Utc)
}

#[allow(clippy::expect_used)]
fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("hardcoded date should always parse")
}

/// A `PENDING` booking ready for confirmation.
#[must_use]
pub fn pending_booking(user_id: &str, booking_id: &str, hotel_id: &str, room_id: &str) -> Booking {
    Booking {
        booking_id: BookingId::new(booking_id),
        user_id: UserId::new(user_id),
        hotel_id: HotelId::new(hotel_id),
        room_id: RoomId::new(room_id),
        room_type: "Deluxe Double".to_string(),
        check_in: date("2025-03-10"),
        check_out: date("2025-03-12"),
        guests: 2,
        total_price: 1_598_00,
        customer_name: "Asha Rao".to_string(),
        customer_email: "asha@example.com".to_string(),
        status: BookingStatus::Pending,
        payment_id: None,
        created_at: created_at(),
    }
}

/// A room inventory record with the given counters.
#[must_use]
pub fn room_inventory(hotel_id: &str, room_id: &str, total: u32, available: u32) -> RoomInventory {
    RoomInventory {
        room_id: RoomId::new(room_id),
        hotel_id: HotelId::new(hotel_id),
        room_type: "Deluxe Double".to_string(),
        total_rooms: total,
        available_rooms: available,
        price_per_night: 799_00,
        capacity: 2,
    }
}

/// A confirmation request matching the fixtures above.
#[must_use]
pub fn confirmation_request(
    user_id: &str,
    booking_id: &str,
    hotel_id: &str,
    room_id: &str,
    payment_id: &str,
) -> ConfirmationRequest {
    ConfirmationRequest {
        user_id: UserId::new(user_id),
        booking_id: BookingId::new(booking_id),
        hotel_id: HotelId::new(hotel_id),
        room_id: RoomId::new(room_id),
        payment_id: PaymentId::new(payment_id),
    }
}
