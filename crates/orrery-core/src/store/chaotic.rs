//! Fault-injecting store wrapper.

use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use orrery_proto::{Collection, DocumentPath};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{CommitOutcome, Mutation, Store, StoreError};

/// Store wrapper that fails a fraction of calls with
/// `StoreError::Unavailable`.
///
/// Faults are injected before the wrapped call is issued, so a failed call
/// never reaches the inner store. This models a request lost on the way to
/// the remote database.
pub struct ChaoticStore<S> {
    inner: S,
    failure_rate: f64,
    rng: Mutex<StdRng>,
    injected: AtomicU64,
}

impl<S: Store> ChaoticStore<S> {
    /// Wrap `inner`, failing calls with probability `failure_rate`
    /// (clamped to `[0, 1]`). The seed makes the fault pattern reproducible.
    pub fn new(inner: S, failure_rate: f64, seed: u64) -> Self {
        Self {
            inner,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            injected: AtomicU64::new(0),
        }
    }

    /// Wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of faults injected so far.
    pub fn injected_faults(&self) -> u64 {
        self.injected.load(Ordering::Relaxed)
    }

    fn maybe_fail(&self, operation: &str) -> Result<(), StoreError> {
        let fail = match self.rng.lock() {
            Ok(mut rng) => rng.gen_bool(self.failure_rate),
            Err(_) => true,
        };

        if fail {
            self.injected.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Injected fault into {}", operation);
            return Err(StoreError::Unavailable { reason: format!("injected fault: {operation}") });
        }
        Ok(())
    }
}

impl<S> std::fmt::Debug for ChaoticStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaoticStore")
            .field("failure_rate", &self.failure_rate)
            .field("injected", &self.injected.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<S: Store> Store for ChaoticStore<S> {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Bytes>, StoreError> {
        self.maybe_fail("get")?;
        self.inner.get(path).await
    }

    async fn create(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        self.maybe_fail("create")?;
        self.inner.create(path, document).await
    }

    async fn put(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        self.maybe_fail("put")?;
        self.inner.put(path, document).await
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Bytes>, StoreError> {
        self.maybe_fail("list")?;
        self.inner.list(collection).await
    }

    async fn commit(
        &self,
        user_id: &str,
        mutation: &Mutation,
    ) -> Result<CommitOutcome, StoreError> {
        self.maybe_fail("commit")?;
        self.inner.commit(user_id, mutation).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn zero_rate_never_fails() {
        let store = ChaoticStore::new(MemoryStore::new(), 0.0, 1);

        for _ in 0..100 {
            store.list(Collection::Avatars).await.unwrap();
        }
        assert_eq!(store.injected_faults(), 0);
    }

    #[tokio::test]
    async fn full_rate_always_fails_without_touching_inner() {
        let store = ChaoticStore::new(MemoryStore::new(), 1.0, 1);
        let path = DocumentPath::new(Collection::Avatars, "a");

        let result = store.put(&path, Bytes::from_static(b"a")).await;

        assert!(matches!(result, Err(ref e) if e.is_transient()));
        assert!(store.inner().is_empty());
        assert_eq!(store.injected_faults(), 1);
    }

    #[tokio::test]
    async fn same_seed_same_fault_pattern() {
        let pattern = |seed| async move {
            let store = ChaoticStore::new(MemoryStore::new(), 0.5, seed);
            let mut faults = Vec::new();
            for _ in 0..32 {
                faults.push(store.list(Collection::Levels).await.is_err());
            }
            faults
        };

        assert_eq!(pattern(7).await, pattern(7).await);
    }
}
