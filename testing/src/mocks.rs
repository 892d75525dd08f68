//! Mock implementations for testing.
//!
//! - `InMemoryDocumentStore`: versioned document store with atomic
//!   conditional commits, matching the production contract exactly
//! - `RecordingNotifier`: captures sent confirmation emails
//! - `FailingNotifier`: fails every delivery, for notification-isolation
//!   tests

use roomledger_core::notifier::{ConfirmationEmail, ConfirmationNotifier, NotifyError};
use roomledger_core::store::{
    Document, DocumentPath, DocumentStore, Expected, StoreError, Version, Write,
};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

/// In-memory document store with optimistic concurrency.
///
/// Each document carries a version incremented on every committed write. A
/// commit batch locks the whole map, checks every write's precondition, and
/// applies all writes or none - the same observable semantics as a hosted
/// document database transaction, which is what makes race tests against
/// this store meaningful.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<DocumentPath, (Version, serde_json::Value)>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document unconditionally at the initial version.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be serialized to JSON. Seeding is test
    /// setup; a bad fixture should fail the test immediately.
    #[allow(clippy::expect_used)]
    pub fn seed<T: Serialize>(&self, path: DocumentPath, value: &T) {
        let value = serde_json::to_value(value).expect("fixture must serialize");
        self.lock().insert(path, (Version::initial(), value));
    }

    /// Read a document and deserialize it, bypassing the async trait.
    ///
    /// Convenience for assertions; returns `None` when the document is
    /// absent or does not match `T`.
    #[must_use]
    pub fn current<T: serde::de::DeserializeOwned>(&self, path: &DocumentPath) -> Option<T> {
        let docs = self.lock();
        let (_, value) = docs.get(path)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Current version of a document, if it exists.
    #[must_use]
    pub fn version_of(&self, path: &DocumentPath) -> Option<Version> {
        self.lock().get(path).map(|(v, _)| *v)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<DocumentPath, (Version, serde_json::Value)>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_and_apply(&self, writes: Vec<Write>) -> Result<(), StoreError> {
        let mut docs = self.lock();

        // Validate every precondition before touching anything.
        for write in &writes {
            let actual = docs.get(&write.path).map(|(v, _)| *v);
            let holds = match (write.expected, actual) {
                (Expected::Missing, None) => true,
                (Expected::Version(expected), Some(actual)) => expected == actual,
                _ => false,
            };
            if !holds {
                return Err(StoreError::VersionConflict {
                    path: write.path.clone(),
                    expected: write.expected,
                    actual,
                });
            }
        }

        for write in writes {
            let next = match write.expected {
                Expected::Missing => Version::initial(),
                Expected::Version(v) => v.next(),
            };
            docs.insert(write.path, (next, write.value));
        }
        Ok(())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get(
        &self,
        path: DocumentPath,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Document>, StoreError>> + Send + '_>> {
        let result = self
            .lock()
            .get(&path)
            .map(|(version, value)| Document {
                value: value.clone(),
                version: *version,
            });
        Box::pin(async move { Ok(result) })
    }

    fn commit(
        &self,
        writes: Vec<Write>,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let result = self.check_and_apply(writes);
        Box::pin(async move { result })
    }
}

/// Notifier that records every email it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<ConfirmationEmail>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails recorded so far.
    #[must_use]
    pub fn sent(&self) -> Vec<ConfirmationEmail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConfirmationNotifier for RecordingNotifier {
    fn send_confirmation(
        &self,
        email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + '_>> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email);
        Box::pin(async { Ok(()) })
    }
}

/// Notifier whose every delivery fails with a transport error.
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl FailingNotifier {
    /// Create the failing notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ConfirmationNotifier for FailingNotifier {
    fn send_confirmation(
        &self,
        _email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + '_>> {
        Box::pin(async { Err(NotifyError::Transport("smtp relay unreachable".to_string())) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(n: u32) -> DocumentPath {
        DocumentPath::hotel(&roomledger_core::HotelId::new(format!("h{n}")))
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_document() {
        let store = InMemoryDocumentStore::new();
        assert!(store.get(path(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_applies_all_or_nothing() {
        let store = InMemoryDocumentStore::new();
        store.seed(path(1), &json!({"n": 1}));

        // Second write's precondition fails (document missing but expected
        // at a version), so the first must not be applied either.
        let result = store
            .commit(vec![
                Write::update(path(1), Version::initial(), json!({"n": 2})),
                Write::update(path(2), Version::initial(), json!({"n": 9})),
            ])
            .await;
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

        let doc = store.get(path(1)).await.unwrap().unwrap();
        assert_eq!(doc.value, json!({"n": 1}));
        assert_eq!(doc.version, Version::initial());
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = InMemoryDocumentStore::new();
        store.seed(path(1), &json!({"n": 1}));

        let read = store.get(path(1)).await.unwrap().unwrap();
        store
            .commit(vec![Write::update(path(1), read.version, json!({"n": 2}))])
            .await
            .unwrap();

        // Re-using the stale version must conflict.
        let result = store
            .commit(vec![Write::update(path(1), read.version, json!({"n": 3}))])
            .await;
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
    }

    #[tokio::test]
    async fn create_requires_absence() {
        let store = InMemoryDocumentStore::new();
        store
            .commit(vec![Write::create(path(1), json!({"n": 1}))])
            .await
            .unwrap();
        let result = store.commit(vec![Write::create(path(1), json!({"n": 2}))]).await;
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
    }
}
