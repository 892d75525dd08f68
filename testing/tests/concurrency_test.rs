//! Concurrency tests for the confirmation transaction.
//!
//! Verifies that racing invocations never double-decrement inventory and
//! never drive the availability counter below zero.
//!
//! Run with: `cargo test --test concurrency_test`

#![allow(clippy::unwrap_used)]

use futures::future::join_all;
use roomledger_core::{ConfirmationError, ConfirmationService, DocumentPath, RoomInventory};
use roomledger_testing::builders::{confirmation_request, pending_booking, room_inventory};
use roomledger_testing::mocks::InMemoryDocumentStore;
use std::sync::Arc;

fn room_of(store: &InMemoryDocumentStore) -> RoomInventory {
    store
        .current(&DocumentPath::room(&"h1".into(), &"r1".into()))
        .unwrap()
}

/// The client path and the webhook path race on the same booking: exactly
/// one performs the transition, the other observes `CONFIRMED` and no-ops,
/// and inventory is decremented exactly once.
#[tokio::test]
async fn client_and_webhook_paths_race_to_one_decrement() {
    for _ in 0..50 {
        let store = Arc::new(InMemoryDocumentStore::new());
        let booking = pending_booking("u1", "b1", "h1", "r1");
        store.seed(
            DocumentPath::booking(&booking.user_id, &booking.booking_id),
            &booking,
        );
        store.seed(
            DocumentPath::room(&booking.hotel_id, &booking.room_id),
            &room_inventory("h1", "r1", 5, 1),
        );
        let service = ConfirmationService::new(store.clone());

        // Same payment id from both sides, as the gateway would report it.
        let request = confirmation_request("u1", "b1", "h1", "r1", "pay_1");

        let client = {
            let service = service.clone();
            let request = request.clone();
            tokio::spawn(async move { service.confirm(&request).await })
        };
        let webhook = {
            let service = service.clone();
            let request = request.clone();
            tokio::spawn(async move { service.confirm(&request).await })
        };

        let first = client.await.unwrap().unwrap();
        let second = webhook.await.unwrap().unwrap();

        // Exactly one of the two performed the transition.
        assert_eq!(
            u32::from(first.newly_confirmed) + u32::from(second.newly_confirmed),
            1
        );
        assert_eq!(room_of(&store).available_rooms, 0);
    }
}

/// N concurrent confirmations of distinct bookings against k < N rooms:
/// exactly k succeed, the rest fail with `InventoryExhausted`, and the
/// counter never goes below zero.
#[tokio::test]
async fn oversubscribed_room_admits_exactly_k_confirmations() {
    const ROOMS: u32 = 3;
    const ATTEMPTS: u32 = 8;

    let store = Arc::new(InMemoryDocumentStore::new());
    store.seed(
        DocumentPath::room(&"h1".into(), &"r1".into()),
        &room_inventory("h1", "r1", ROOMS, ROOMS),
    );
    for i in 0..ATTEMPTS {
        let booking = pending_booking("u1", &format!("b{i}"), "h1", "r1");
        store.seed(
            DocumentPath::booking(&booking.user_id, &booking.booking_id),
            &booking,
        );
    }
    let service = ConfirmationService::new(store.clone());

    let tasks: Vec<_> = (0..ATTEMPTS)
        .map(|i| {
            let service = service.clone();
            let request =
                confirmation_request("u1", &format!("b{i}"), "h1", "r1", &format!("pay_{i}"));
            tokio::spawn(async move { service.confirm(&request).await })
        })
        .collect();

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let confirmed = results.iter().filter(|r| r.is_ok()).count();
    let exhausted = results
        .iter()
        .filter(|r| matches!(r, Err(ConfirmationError::InventoryExhausted { .. })))
        .count();

    assert_eq!(confirmed, ROOMS as usize);
    assert_eq!(exhausted, (ATTEMPTS - ROOMS) as usize);
    assert_eq!(room_of(&store).available_rooms, 0);
}

/// Redelivering a webhook after the race has settled stays a no-op.
#[tokio::test]
async fn redelivery_after_settled_race_is_still_noop() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let booking = pending_booking("u1", "b1", "h1", "r1");
    store.seed(
        DocumentPath::booking(&booking.user_id, &booking.booking_id),
        &booking,
    );
    store.seed(
        DocumentPath::room(&booking.hotel_id, &booking.room_id),
        &room_inventory("h1", "r1", 5, 2),
    );
    let service = ConfirmationService::new(store.clone());
    let request = confirmation_request("u1", "b1", "h1", "r1", "pay_1");

    service.confirm(&request).await.unwrap();
    for _ in 0..5 {
        let outcome = service.confirm(&request).await.unwrap();
        assert!(!outcome.newly_confirmed);
    }
    assert_eq!(room_of(&store).available_rooms, 1);
}
