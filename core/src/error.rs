//! Error taxonomy for the confirmation subsystem.
//!
//! The variants deliberately separate three families with different retry
//! semantics:
//!
//! - rejections that no retry can fix (`Authentication`, `BookingNotFound`,
//!   `RoomNotFound`, `InvalidState`)
//! - business conflicts that need a compensating action, not a retry
//!   (`InventoryExhausted`)
//! - transient faults where retrying the whole operation is safe
//!   (`Transient`, `Store` backend failures)
//!
//! HTTP status mapping lives in `roomledger-web`; this crate never speaks
//! HTTP.

use crate::store::StoreError;
use crate::types::{BookingId, BookingStatus, HotelId, RoomId};
use thiserror::Error;

/// Typed failure of the confirmation subsystem.
#[derive(Error, Debug)]
pub enum ConfirmationError {
    /// Missing or unusable deployment configuration (e.g. empty secret).
    /// Fatal; fix the deployment.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Signature verification failed; the signal did not come from the
    /// payment gateway. Reject, never run the transaction.
    #[error("payment signature verification failed")]
    Authentication,

    /// The booking the payment refers to does not exist. The event was
    /// well-formed but cannot ever be applied; needs investigation.
    #[error("booking {booking_id} not found")]
    BookingNotFound {
        /// The booking that was looked up.
        booking_id: BookingId,
    },

    /// The room inventory record does not exist.
    #[error("room {room_id} of hotel {hotel_id} not found")]
    RoomNotFound {
        /// Owning hotel.
        hotel_id: HotelId,
        /// The room that was looked up.
        room_id: RoomId,
    },

    /// The booking is in a status the transaction cannot act on (neither
    /// pending nor already confirmed). Should not occur in normal flow.
    #[error("booking {booking_id} is {status}, cannot confirm")]
    InvalidState {
        /// The booking in the unexpected status.
        booking_id: BookingId,
        /// The status that was found.
        status: BookingStatus,
    },

    /// Overbooking detected: payment captured but no inventory left. A
    /// business conflict requiring operator attention (refund), distinct
    /// from transient failures so it is never blindly retried into a loop.
    #[error("no rooms available for {room_id} of hotel {hotel_id} (overbooking detected)")]
    InventoryExhausted {
        /// Owning hotel.
        hotel_id: HotelId,
        /// The exhausted room type.
        room_id: RoomId,
    },

    /// The transaction kept losing version conflicts until the retry budget
    /// ran out. Safe for the caller to retry the whole operation.
    #[error("confirmation did not commit within {attempts} attempts")]
    Transient {
        /// How many read-validate-write attempts were made.
        attempts: u32,
    },

    /// Store backend or serialization failure outside the conflict path.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ConfirmationError {
    /// Whether retrying the whole operation may succeed.
    ///
    /// Business conflicts and rejections return `false`; only transient
    /// store-level faults return `true`.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transient { .. } | Self::Store(StoreError::Backend(_))
        )
    }
}
