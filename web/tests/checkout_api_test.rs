//! End-to-end tests for the browser checkout-confirmation endpoint.
//!
//! Run with: `cargo test --test checkout_api_test`

#![allow(clippy::unwrap_used)]

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use roomledger_core::{
    Booking, BookingId, BookingStatus, DocumentPath, HotelId, OrderId, PaymentId, PaymentVerifier,
    RoomId, RoomInventory, UserId,
};
use roomledger_testing::builders::{pending_booking, room_inventory};
use roomledger_testing::mocks::{InMemoryDocumentStore, RecordingNotifier};
use roomledger_web::{AppState, build_router};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const WEBHOOK_SECRET: &str = "whsec_test";
const KEY_SECRET: &str = "keysec_test";

struct Harness {
    server: TestServer,
    store: Arc<InMemoryDocumentStore>,
    notifier: Arc<RecordingNotifier>,
    verifier: PaymentVerifier,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryDocumentStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let verifier = PaymentVerifier::new(WEBHOOK_SECRET, KEY_SECRET).unwrap();
    let state = AppState::new(store.clone(), verifier.clone(), notifier.clone());
    let server = TestServer::new(build_router(state)).unwrap();
    Harness {
        server,
        store,
        notifier,
        verifier,
    }
}

fn seed_confirmable(store: &InMemoryDocumentStore) {
    store.seed(DocumentPath::hotel(&HotelId::new("h1")), &json!({"name": "Seaview Palace"}));
    store.seed(
        DocumentPath::booking(&UserId::new("u1"), &BookingId::new("b1")),
        &pending_booking("u1", "b1", "h1", "r1"),
    );
    store.seed(
        DocumentPath::room(&HotelId::new("h1"), &RoomId::new("r1")),
        &room_inventory("h1", "r1", 10, 3),
    );
}

fn checkout_body(signature: &str) -> serde_json::Value {
    json!({
        "razorpay_order_id": "order_1",
        "razorpay_payment_id": "pay_1",
        "razorpay_signature": signature,
        "user_id": "u1",
        "booking_id": "b1",
        "hotel_id": "h1",
        "room_id": "r1"
    })
}

fn checkout_signature(verifier: &PaymentVerifier) -> String {
    verifier
        .sign_checkout(&OrderId::new("order_1"), &PaymentId::new("pay_1"))
        .unwrap()
}

fn booking(store: &InMemoryDocumentStore) -> Booking {
    store
        .current(&DocumentPath::booking(&UserId::new("u1"), &BookingId::new("b1")))
        .unwrap()
}

fn room(store: &InMemoryDocumentStore) -> RoomInventory {
    store
        .current(&DocumentPath::room(&HotelId::new("h1"), &RoomId::new("r1")))
        .unwrap()
}

#[tokio::test]
async fn valid_checkout_callback_confirms_booking() {
    let h = harness();
    seed_confirmable(&h.store);

    let sig = checkout_signature(&h.verifier);
    let response = h
        .server
        .post("/api/payments/confirm")
        .json(&checkout_body(&sig))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "CONFIRMED");
    assert_eq!(body["payment_id"], "pay_1");

    assert_eq!(booking(&h.store).status, BookingStatus::Confirmed);
    assert_eq!(room(&h.store).available_rooms, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn wrong_signature_is_rejected_without_mutation() {
    let h = harness();
    seed_confirmable(&h.store);

    // Signed with the webhook secret instead of the key secret.
    let wrong = h
        .verifier
        .sign_webhook_body(b"order_1|pay_1")
        .unwrap();
    let response = h
        .server
        .post("/api/payments/confirm")
        .json(&checkout_body(&wrong))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(booking(&h.store).status, BookingStatus::Pending);
    assert_eq!(room(&h.store).available_rooms, 3);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn unknown_booking_returns_not_found() {
    let h = harness();
    h.store.seed(
        DocumentPath::room(&HotelId::new("h1"), &RoomId::new("r1")),
        &room_inventory("h1", "r1", 10, 3),
    );

    let sig = checkout_signature(&h.verifier);
    let response = h
        .server
        .post("/api/payments/confirm")
        .json(&checkout_body(&sig))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(room(&h.store).available_rooms, 3);
}

#[tokio::test]
async fn cancelled_booking_returns_conflict() {
    let h = harness();
    let mut cancelled = pending_booking("u1", "b1", "h1", "r1");
    cancelled.status = BookingStatus::Cancelled;
    h.store.seed(
        DocumentPath::booking(&UserId::new("u1"), &BookingId::new("b1")),
        &cancelled,
    );
    h.store.seed(
        DocumentPath::room(&HotelId::new("h1"), &RoomId::new("r1")),
        &room_inventory("h1", "r1", 10, 3),
    );

    let sig = checkout_signature(&h.verifier);
    let response = h
        .server
        .post("/api/payments/confirm")
        .json(&checkout_body(&sig))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(room(&h.store).available_rooms, 3);
}

#[tokio::test]
async fn exhausted_inventory_returns_conflict() {
    let h = harness();
    h.store.seed(
        DocumentPath::booking(&UserId::new("u1"), &BookingId::new("b1")),
        &pending_booking("u1", "b1", "h1", "r1"),
    );
    h.store.seed(
        DocumentPath::room(&HotelId::new("h1"), &RoomId::new("r1")),
        &room_inventory("h1", "r1", 10, 0),
    );

    let sig = checkout_signature(&h.verifier);
    let response = h
        .server
        .post("/api/payments/confirm")
        .json(&checkout_body(&sig))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(booking(&h.store).status, BookingStatus::Pending);
}

#[tokio::test]
async fn checkout_then_webhook_is_idempotent_across_paths() {
    let h = harness();
    seed_confirmable(&h.store);

    // Browser callback lands first.
    let sig = checkout_signature(&h.verifier);
    h.server
        .post("/api/payments/confirm")
        .json(&checkout_body(&sig))
        .await
        .assert_status(StatusCode::OK);

    // Gateway webhook for the same payment arrives later.
    let webhook_body = json!({
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": "pay_1",
                    "notes": {
                        "user_id": "u1",
                        "booking_id": "b1",
                        "hotel_id": "h1",
                        "room_id": "r1"
                    }
                }
            }
        }
    })
    .to_string();
    let webhook_sig = h.verifier.sign_webhook_body(webhook_body.as_bytes()).unwrap();
    let response = h
        .server
        .post("/webhooks/razorpay")
        .add_header(
            HeaderName::from_static("x-razorpay-signature"),
            HeaderValue::from_str(&webhook_sig).unwrap(),
        )
        .content_type("application/json")
        .bytes(webhook_body.into_bytes().into())
        .await;

    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({"status": "already-confirmed"}));
    assert_eq!(room(&h.store).available_rooms, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.notifier.sent().len(), 1);
}
