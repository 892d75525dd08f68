//! # Room Ledger Core
//!
//! Domain types and the booking confirmation transaction for Room Ledger.
//!
//! This crate holds the one correctness-critical piece of the booking system:
//! the logic that, given a captured payment, atomically decides whether a room
//! is still available, decrements its inventory, and flips a booking from
//! `PENDING` to `CONFIRMED` - exactly once, no matter how many times it is
//! invoked.
//!
//! ## Core Concepts
//!
//! - **`DocumentStore`**: Minimal abstraction over a document database with
//!   multi-document conditional writes (optimistic concurrency)
//! - **`PaymentVerifier`**: HMAC-SHA256 authentication of payment gateway
//!   signals, both the webhook form and the checkout-redirect form
//! - **`ConfirmationService`**: The idempotent read-validate-write transaction
//! - **`ConfirmationNotifier`**: Best-effort post-commit customer notification
//!
//! ## Architecture Principles
//!
//! - Explicit dependency injection (no process-global client handles)
//! - One canonical confirmation routine shared by every entry point
//! - Typed failures: business conflicts are never reported as transient errors

pub mod confirmation;
pub mod error;
pub mod notifier;
pub mod store;
pub mod types;
pub mod verifier;

pub use confirmation::{ConfirmationOutcome, ConfirmationRequest, ConfirmationService};
pub use error::ConfirmationError;
pub use notifier::{ConfirmationEmail, ConfirmationNotifier, NotifyError};
pub use store::{Document, DocumentPath, DocumentStore, Expected, StoreError, Version, Write};
pub use types::{
    Booking, BookingId, BookingStatus, HotelId, OrderId, PaymentId, RoomId, RoomInventory, UserId,
};
pub use verifier::PaymentVerifier;
