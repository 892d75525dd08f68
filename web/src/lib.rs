//! # Room Ledger Web
//!
//! Axum HTTP surface for the booking confirmation service.
//!
//! Two entry points converge on the single confirmation transaction in
//! `roomledger-core`:
//!
//! - `POST /webhooks/razorpay` - asynchronous server-to-server webhook from
//!   the payment gateway (possibly delivered multiple times)
//! - `POST /api/payments/confirm` - browser-originated callback fired right
//!   after checkout completion
//!
//! Neither path coordinates with the other; whichever commits first wins and
//! the loser observes the already-confirmed booking.

pub mod config;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;
