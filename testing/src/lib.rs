//! # Room Ledger Testing
//!
//! Testing utilities and helpers for the Room Ledger booking service.
//!
//! This crate provides:
//! - An in-memory `DocumentStore` with the exact optimistic-concurrency
//!   semantics the confirmation transaction relies on
//! - Notifier doubles that record or deliberately fail deliveries
//! - Builders for booking and room-inventory fixtures
//!
//! ## Example
//!
//! ```
//! use roomledger_testing::mocks::InMemoryDocumentStore;
//! use roomledger_testing::builders;
//! use roomledger_core::{ConfirmationRequest, ConfirmationService, DocumentPath};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let booking = builders::pending_booking("u1", "b1", "h1", "r1");
//! store.seed(DocumentPath::booking(&booking.user_id, &booking.booking_id), &booking);
//! store.seed(
//!     DocumentPath::room(&booking.hotel_id, &booking.room_id),
//!     &builders::room_inventory("h1", "r1", 5, 5),
//! );
//!
//! let service = ConfirmationService::new(store.clone());
//! let outcome = service
//!     .confirm(&builders::confirmation_request("u1", "b1", "h1", "r1", "pay_1"))
//!     .await;
//! assert!(outcome.is_ok());
//! # }
//! ```

pub mod builders;
pub mod mocks;
