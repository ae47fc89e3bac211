//! Store wrapper with simulated network latency.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use orrery_core::{CommitOutcome, Environment, Mutation, Store, StoreError};
use orrery_proto::{Collection, DocumentPath};

/// Adds a random delay before and after every call, like a request and its
/// response crossing a network.
///
/// The wrapped call itself still runs in one piece, so two simulated devices
/// can interleave between calls but never inside a commit.
#[derive(Debug, Clone)]
pub struct SimStore<S, E> {
    inner: S,
    env: E,
    max_latency: Duration,
}

impl<S: Store, E: Environment> SimStore<S, E> {
    /// Wrap `inner` with up to `max_latency` per leg.
    pub fn new(inner: S, env: E, max_latency: Duration) -> Self {
        Self { inner, env, max_latency }
    }

    /// Wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn leg(&self) {
        let delay = self.env.random_duration(self.max_latency);
        tracing::trace!("Simulated store latency {:?}", delay);
        self.env.sleep(delay).await;
    }
}

#[async_trait]
impl<S: Store, E: Environment> Store for SimStore<S, E> {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Bytes>, StoreError> {
        self.leg().await;
        let result = self.inner.get(path).await;
        self.leg().await;
        result
    }

    async fn create(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        self.leg().await;
        let result = self.inner.create(path, document).await;
        self.leg().await;
        result
    }

    async fn put(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        self.leg().await;
        let result = self.inner.put(path, document).await;
        self.leg().await;
        result
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Bytes>, StoreError> {
        self.leg().await;
        let result = self.inner.list(collection).await;
        self.leg().await;
        result
    }

    async fn commit(
        &self,
        user_id: &str,
        mutation: &Mutation,
    ) -> Result<CommitOutcome, StoreError> {
        self.leg().await;
        let result = self.inner.commit(user_id, mutation).await;
        self.leg().await;
        result
    }
}
