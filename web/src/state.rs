//! Application state for the confirmation HTTP server.
//!
//! All collaborators are explicitly constructed and injected handles - no
//! lazily initialized process-global client. That keeps handlers testable
//! against the in-memory store and the notifier doubles.

use roomledger_core::{ConfirmationNotifier, ConfirmationService, DocumentStore, PaymentVerifier};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Document store handle (also used directly for the best-effort hotel
    /// name lookup after a confirmation commits)
    pub store: Arc<dyn DocumentStore>,

    /// Signature verifier for both payment-signal forms
    pub verifier: Arc<PaymentVerifier>,

    /// The canonical confirmation transaction
    pub confirmations: ConfirmationService,

    /// Post-confirmation customer notification sender
    pub notifier: Arc<dyn ConfirmationNotifier>,
}

impl AppState {
    /// Create the application state.
    ///
    /// The confirmation service is built over the same store handle the
    /// handlers use, so every entry point runs the same transaction against
    /// the same data.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        verifier: PaymentVerifier,
        notifier: Arc<dyn ConfirmationNotifier>,
    ) -> Self {
        Self {
            confirmations: ConfirmationService::new(store.clone()),
            store,
            verifier: Arc::new(verifier),
            notifier,
        }
    }
}
