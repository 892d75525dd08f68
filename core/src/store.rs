//! Document store trait and related types.
//!
//! This module defines the core abstraction over a document database with
//! multi-document atomic transactions and optimistic read-then-write
//! semantics: read a document (with its version), validate, then write
//! conditionally on the version still being current.
//!
//! # Design
//!
//! The `DocumentStore` trait is deliberately minimal. It provides exactly
//! what the confirmation transaction needs:
//!
//! - Read a document by path, returning its payload and version
//! - Commit a batch of conditional writes atomically
//!
//! A commit fails as a whole if any document's version moved since it was
//! read. The caller then re-runs its read-validate-write sequence against the
//! post-commit state, which is how two racing confirmations of the same
//! booking resolve: the loser re-reads, observes `CONFIRMED`, and no-ops.
//!
//! # Implementations
//!
//! - `InMemoryDocumentStore` (in `roomledger-testing`): fast, deterministic
//!   testing against the exact conflict semantics above
//!
//! Production backends (hosted document databases) live behind the same
//! trait and are out of scope for this crate.
//!
//! # Dyn Compatibility
//!
//! The trait uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` so it can be used as a trait object (`Arc<dyn DocumentStore>`)
//! injected into the confirmation service.

use crate::types::{BookingId, HotelId, RoomId, UserId};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Optimistic concurrency conflict: a document changed between read and commit.
    ///
    /// Another invocation committed to one of the documents in the batch. The
    /// whole batch was rejected; re-run the read-validate-write sequence.
    #[error("version conflict on {path}: expected {expected}, found {actual:?}")]
    VersionConflict {
        /// The document where the conflict was detected.
        path: DocumentPath,
        /// The expectation the write carried.
        expected: Expected,
        /// The version actually present at commit time.
        actual: Option<Version>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend connection or request error.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Path of a document in the store.
///
/// Paths are hierarchical strings mirroring the database layout. The two
/// constructors cover the documents this subsystem owns:
///
/// - bookings, keyed under their user: `users/{user_id}/bookings/{booking_id}`
/// - room inventory, keyed under its hotel: `hotels/{hotel_id}/rooms/{room_id}`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Path of a booking document.
    #[must_use]
    pub fn booking(user_id: &UserId, booking_id: &BookingId) -> Self {
        Self(format!("users/{user_id}/bookings/{booking_id}"))
    }

    /// Path of a room inventory document.
    #[must_use]
    pub fn room(hotel_id: &HotelId, room_id: &RoomId) -> Self {
        Self(format!("hotels/{hotel_id}/rooms/{room_id}"))
    }

    /// Path of a hotel document (read-only here, for display names).
    #[must_use]
    pub fn hotel(hotel_id: &HotelId) -> Self {
        Self(format!("hotels/{hotel_id}"))
    }

    /// Get the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic version of a document, incremented on every committed write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// Version of a freshly created document.
    #[must_use]
    pub const fn initial() -> Self {
        Self(0)
    }

    /// Create a version from a raw counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The version after one committed write.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A document as read from the store: JSON payload plus its current version.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// JSON payload.
    pub value: serde_json::Value,
    /// Version observed at read time; pass back in a `Write` to commit
    /// conditionally on the document not having changed.
    pub version: Version,
}

impl Document {
    /// Deserialize the payload into a domain type.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the payload does not match the
    /// expected shape.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.value.clone()).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Serialize a domain type into a JSON payload for a write.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the value cannot be represented
    /// as JSON.
    pub fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
        serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Precondition a conditional write carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expected {
    /// The document must not exist (create).
    Missing,
    /// The document must still be at this version (update).
    Version(Version),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Version(v) => write!(f, "{v}"),
        }
    }
}

/// One conditional write in a commit batch.
#[derive(Clone, Debug)]
pub struct Write {
    /// Target document.
    pub path: DocumentPath,
    /// Precondition; the whole batch fails if it does not hold.
    pub expected: Expected,
    /// New payload.
    pub value: serde_json::Value,
}

impl Write {
    /// Conditional update of an existing document.
    #[must_use]
    pub const fn update(path: DocumentPath, read_at: Version, value: serde_json::Value) -> Self {
        Self {
            path,
            expected: Expected::Version(read_at),
            value,
        }
    }

    /// Conditional creation of a new document.
    #[must_use]
    pub const fn create(path: DocumentPath, value: serde_json::Value) -> Self {
        Self {
            path,
            expected: Expected::Missing,
            value,
        }
    }
}

/// Document store abstraction with optimistic multi-document transactions.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the confirmation service is invoked
/// concurrently from independent request handlers sharing one store handle.
pub trait DocumentStore: Send + Sync {
    /// Read a document by path.
    ///
    /// Returns `None` if the document does not exist (not an error).
    ///
    /// # Errors
    ///
    /// - `Backend`: connection or request failure
    fn get(
        &self,
        path: DocumentPath,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Document>, StoreError>> + Send + '_>>;

    /// Atomically apply a batch of conditional writes.
    ///
    /// Either every write in the batch is applied, or none is. Each write's
    /// precondition is checked against the store's current state inside the
    /// same transaction; the first violated precondition fails the batch with
    /// `VersionConflict`.
    ///
    /// # Errors
    ///
    /// - `VersionConflict`: a document changed since it was read (concurrent
    ///   commit); safe and expected to retry the surrounding read-validate-write
    /// - `Backend`: connection or request failure
    fn commit(
        &self,
        writes: Vec<Write>,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_path_layout() {
        let path = DocumentPath::booking(&UserId::new("u1"), &BookingId::new("b1"));
        assert_eq!(path.as_str(), "users/u1/bookings/b1");
    }

    #[test]
    fn room_path_layout() {
        let path = DocumentPath::room(&HotelId::new("h1"), &RoomId::new("r1"));
        assert_eq!(path.as_str(), "hotels/h1/rooms/r1");
    }

    #[test]
    fn version_conflict_display() {
        let error = StoreError::VersionConflict {
            path: DocumentPath::hotel(&HotelId::new("h1")),
            expected: Expected::Version(Version::new(3)),
            actual: Some(Version::new(4)),
        };
        let display = format!("{error}");
        assert!(display.contains("hotels/h1"));
        assert!(display.contains("v3"));
    }
}
