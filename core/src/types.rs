//! Domain types for the booking confirmation subsystem.
//!
//! Identifiers are opaque string newtypes: bookings are keyed by
//! caller-supplied or server-generated strings, and payment/order identifiers
//! are issued by the payment gateway in its own format. The newtypes buy type
//! safety without constraining the provider's identifier scheme.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id! {
    /// Unique identifier for a user (bookings are scoped under a user).
    UserId
}

string_id! {
    /// Unique identifier for a booking.
    BookingId
}

string_id! {
    /// Unique identifier for a hotel.
    HotelId
}

string_id! {
    /// Unique identifier for a room type within a hotel.
    RoomId
}

string_id! {
    /// Payment identifier issued by the payment gateway on capture.
    PaymentId
}

string_id! {
    /// Order identifier issued by the payment gateway at checkout creation.
    OrderId
}

// ============================================================================
// Booking
// ============================================================================

/// Lifecycle status of a booking.
///
/// A booking transitions `Pending -> Confirmed` at most once. `Confirmed` is
/// terminal for this subsystem; cancellation happens elsewhere and only ever
/// applies to bookings this subsystem has not touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Created when the user initiated payment; inventory not yet reserved.
    Pending,
    /// Payment captured and one inventory unit durably reserved.
    Confirmed,
    /// Abandoned or cancelled outside this subsystem.
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Confirmed => write!(f, "CONFIRMED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A reservation record for a specific room, date range, and customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier (scoped under `user_id`)
    pub booking_id: BookingId,
    /// Owning user
    pub user_id: UserId,
    /// Hotel the booking belongs to
    pub hotel_id: HotelId,
    /// Room type being reserved
    pub room_id: RoomId,
    /// Display name of the room type
    pub room_type: String,
    /// Check-in date
    pub check_in: NaiveDate,
    /// Check-out date
    pub check_out: NaiveDate,
    /// Number of guests
    pub guests: u32,
    /// Total price in currency minor units (e.g. paise, cents)
    pub total_price: i64,
    /// Customer display name
    pub customer_name: String,
    /// Customer email address (confirmation recipient)
    pub customer_email: String,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Gateway payment identifier, set on confirmation
    pub payment_id: Option<PaymentId>,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Room inventory
// ============================================================================

/// Inventory record for a room type, owned by a hotel.
///
/// `available_rooms` is the only shared mutable counter in the system. It is
/// mutated exclusively by the confirmation transaction, under the store's
/// conditional-write semantics, which is what keeps `0 <= available_rooms <=
/// total_rooms` true under concurrency. The unsigned type makes the lower
/// bound unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInventory {
    /// Room type identifier
    pub room_id: RoomId,
    /// Owning hotel
    pub hotel_id: HotelId,
    /// Display name of the room type
    pub room_type: String,
    /// Capacity of this room type (number of physical rooms)
    pub total_rooms: u32,
    /// Rooms not yet claimed by a confirmed booking
    pub available_rooms: u32,
    /// Price per night in currency minor units
    pub price_per_night: i64,
    /// Guests per room
    pub capacity: u32,
}
