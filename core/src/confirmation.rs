//! The idempotent booking confirmation transaction.
//!
//! Given a captured payment, atomically transitions a booking from `PENDING`
//! to `CONFIRMED` and decrements the matching room's available-inventory
//! counter - exactly once, even when invoked concurrently by the browser
//! callback path and the webhook path, and even when the gateway redelivers
//! the webhook.
//!
//! # How the race resolves
//!
//! Every invocation runs the same read-validate-write sequence. The commit is
//! conditional on the versions read; when two invocations race, the store
//! rejects the second commit with a version conflict and the sequence is
//! re-run. On the re-run the booking reads back `CONFIRMED` and the
//! idempotency check short-circuits: success, no writes, no second decrement.
//!
//! There is exactly one routine. Every entry point (webhook, client
//! callback) converges here after its own verification form; none carries a
//! private variant of this logic.

use crate::error::ConfirmationError;
use crate::store::{Document, DocumentPath, DocumentStore, StoreError, Write};
use crate::types::{Booking, BookingId, BookingStatus, HotelId, PaymentId, RoomId, UserId};
use std::sync::Arc;

/// Upper bound on read-validate-write attempts before the operation is
/// surfaced as transient. Conflicts beyond the first retry are rare: a loser
/// of the confirmation race resolves via the idempotency check on its second
/// read, so sustained conflict means unrelated writers are hammering the
/// same documents.
pub const MAX_COMMIT_ATTEMPTS: u32 = 5;

/// Input to the confirmation transaction, assembled by an entry point after
/// its verification form has passed.
#[derive(Clone, Debug)]
pub struct ConfirmationRequest {
    /// Owner of the booking.
    pub user_id: UserId,
    /// Booking to confirm.
    pub booking_id: BookingId,
    /// Hotel owning the room inventory.
    pub hotel_id: HotelId,
    /// Room type whose inventory backs the booking.
    pub room_id: RoomId,
    /// Gateway payment identifier to record on the booking.
    pub payment_id: PaymentId,
}

/// Result of a successful confirmation call.
#[derive(Clone, Debug)]
pub struct ConfirmationOutcome {
    /// Final field values of the booking (for downstream notification).
    pub booking: Booking,
    /// `true` if this call performed the transition; `false` if the booking
    /// was already confirmed and the call was an idempotent no-op.
    pub newly_confirmed: bool,
}

/// The canonical confirmation routine, shared by all entry points.
///
/// Holds an injected store handle; constructing one has no side effects.
#[derive(Clone)]
pub struct ConfirmationService {
    store: Arc<dyn DocumentStore>,
}

impl ConfirmationService {
    /// Create a service over the given document store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Confirm a booking against a captured payment.
    ///
    /// Safe to call repeatedly and concurrently for the same booking: the
    /// first commit wins, every later call observes `CONFIRMED` and returns
    /// success without writes.
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` / `RoomNotFound`: referenced documents are absent
    /// - `InvalidState`: booking is neither pending nor confirmed
    /// - `InventoryExhausted`: no rooms left (overbooking; do not retry)
    /// - `Transient`: version conflicts exhausted the retry budget
    /// - `Store`: backend failure
    pub async fn confirm(
        &self,
        request: &ConfirmationRequest,
    ) -> Result<ConfirmationOutcome, ConfirmationError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.try_confirm(request).await {
                Err(ConfirmationError::Store(StoreError::VersionConflict { path, .. })) => {
                    if attempts >= MAX_COMMIT_ATTEMPTS {
                        tracing::warn!(
                            booking_id = %request.booking_id,
                            payment_id = %request.payment_id,
                            attempts,
                            "confirmation retry budget exhausted"
                        );
                        return Err(ConfirmationError::Transient { attempts });
                    }
                    tracing::debug!(
                        booking_id = %request.booking_id,
                        conflicting_path = %path,
                        attempt = attempts,
                        "version conflict, re-running confirmation"
                    );
                }
                Ok(outcome) => {
                    if outcome.newly_confirmed {
                        tracing::info!(
                            booking_id = %request.booking_id,
                            payment_id = %request.payment_id,
                            "booking confirmed"
                        );
                    } else {
                        tracing::info!(
                            booking_id = %request.booking_id,
                            payment_id = %request.payment_id,
                            "booking already confirmed, idempotent no-op"
                        );
                    }
                    return Ok(outcome);
                }
                Err(err) => {
                    tracing::warn!(
                        booking_id = %request.booking_id,
                        payment_id = %request.payment_id,
                        error = %err,
                        "confirmation rejected"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// One read-validate-write pass. A `VersionConflict` from the commit is
    /// returned to `confirm` for re-running; every other outcome is final.
    async fn try_confirm(
        &self,
        request: &ConfirmationRequest,
    ) -> Result<ConfirmationOutcome, ConfirmationError> {
        let booking_path = DocumentPath::booking(&request.user_id, &request.booking_id);
        let booking_doc = self.store.get(booking_path.clone()).await?.ok_or_else(|| {
            ConfirmationError::BookingNotFound {
                booking_id: request.booking_id.clone(),
            }
        })?;
        let mut booking: Booking = booking_doc.to_typed()?;

        match booking.status {
            // Idempotency: retries, duplicate webhook deliveries, and the
            // loser of the client/webhook race all land here.
            BookingStatus::Confirmed => {
                return Ok(ConfirmationOutcome {
                    booking,
                    newly_confirmed: false,
                });
            }
            BookingStatus::Pending => {}
            status => {
                return Err(ConfirmationError::InvalidState {
                    booking_id: request.booking_id.clone(),
                    status,
                });
            }
        }

        let room_path = DocumentPath::room(&request.hotel_id, &request.room_id);
        let room_doc = self.store.get(room_path.clone()).await?.ok_or_else(|| {
            ConfirmationError::RoomNotFound {
                hotel_id: request.hotel_id.clone(),
                room_id: request.room_id.clone(),
            }
        })?;
        let mut room: crate::types::RoomInventory = room_doc.to_typed()?;

        if room.available_rooms == 0 {
            return Err(ConfirmationError::InventoryExhausted {
                hotel_id: request.hotel_id.clone(),
                room_id: request.room_id.clone(),
            });
        }

        room.available_rooms -= 1;
        booking.status = BookingStatus::Confirmed;
        booking.payment_id = Some(request.payment_id.clone());

        // Both writes are conditional on the versions read above and commit
        // as one atomic batch; a concurrent confirmation of either document
        // fails the whole batch.
        self.store
            .commit(vec![
                Write::update(booking_path, booking_doc.version, Document::encode(&booking)?),
                Write::update(room_path, room_doc.version, Document::encode(&room)?),
            ])
            .await?;

        Ok(ConfirmationOutcome {
            booking,
            newly_confirmed: true,
        })
    }
}
