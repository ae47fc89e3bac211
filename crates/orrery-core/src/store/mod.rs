//! Document store abstraction.
//!
//! The store is the remote document database the app talks to. It offers
//! plain document reads and writes for catalog data, and exactly one
//! mutation primitive for user accounts: [`Store::commit`], an atomic
//! conditional update of a single account document.
//!
//! # Invariants
//!
//! - Atomicity: a commit applies every step of its [`Mutation`] or none
//! - Serialization: commits to the same account never interleave
//! - Faults happen between calls, never halfway through a commit

mod chaotic;
mod memory;
mod mutation;
pub mod records;

use async_trait::async_trait;
use bytes::Bytes;
pub use chaotic::ChaoticStore;
pub use memory::MemoryStore;
pub use mutation::{Condition, FieldOp, Mutation, Rejection, Step};
use orrery_proto::{Collection, DocumentPath, ProtoError, UserAccount};
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document does not exist.
    #[error("document not found: {path}")]
    NotFound {
        /// Missing document.
        path: DocumentPath,
    },

    /// Document already exists (create only).
    #[error("document already exists: {path}")]
    AlreadyExists {
        /// Existing document.
        path: DocumentPath,
    },

    /// Document id cannot be stored (empty, or contains path separators).
    #[error("invalid document path: {path}")]
    InvalidPath {
        /// Rejected path.
        path: DocumentPath,
    },

    /// A mutation precondition failed.
    #[error("commit rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Store could not be reached or failed transiently.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Description of the failure.
        reason: String,
    },

    /// A stored document could not be decoded or encoded.
    #[error("codec error: {0}")]
    Codec(#[from] ProtoError),
}

impl StoreError {
    /// Returns true if retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Account state after the commit.
    pub account: UserAccount,
    /// Per step, whether it changed the account.
    pub changed: Vec<bool>,
    /// Document version after the commit (increments on every commit).
    pub version: u64,
}

impl CommitOutcome {
    /// Whether step `index` changed the account. Out-of-range is `false`.
    pub fn step_changed(&self, index: usize) -> bool {
        self.changed.get(index).copied().unwrap_or(false)
    }
}

/// Remote document store.
///
/// All methods are async: every call suspends only the initiating flow until
/// the store responds.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read a document.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Bytes>, StoreError>;

    /// Write a document that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the path is taken.
    async fn create(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError>;

    /// Write a document unconditionally. Used for catalog seeding.
    async fn put(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError>;

    /// Read every document of a collection, ordered by document id.
    async fn list(&self, collection: Collection) -> Result<Vec<Bytes>, StoreError>;

    /// Atomically apply `mutation` to `users/{user_id}`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account does not exist
    /// - `StoreError::Rejected` if a precondition failed (nothing applied)
    async fn commit(
        &self,
        user_id: &str,
        mutation: &Mutation,
    ) -> Result<CommitOutcome, StoreError>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Bytes>, StoreError> {
        (**self).get(path).await
    }

    async fn create(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        (**self).create(path, document).await
    }

    async fn put(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        (**self).put(path, document).await
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Bytes>, StoreError> {
        (**self).list(collection).await
    }

    async fn commit(
        &self,
        user_id: &str,
        mutation: &Mutation,
    ) -> Result<CommitOutcome, StoreError> {
        (**self).commit(user_id, mutation).await
    }
}
