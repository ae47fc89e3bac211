//! In-memory document store.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use bytes::Bytes;
use orrery_proto::{Collection, DocumentPath, UserAccount, decode, encode};

use super::{CommitOutcome, Mutation, Store, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    document: Bytes,
    version: u64,
}

/// In-memory store for tests and simulation.
///
/// Cloning shares the underlying documents, so several simulated devices can
/// talk to the same store. A single lock serializes every operation, which
/// makes each commit atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<BTreeMap<DocumentPath, Entry>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current version of a document, if present.
    pub fn version(&self, path: &DocumentPath) -> Option<u64> {
        self.lock().ok()?.get(path).map(|e| e.version)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<DocumentPath, Entry>>, StoreError> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Unavailable { reason: "memory store lock poisoned".into() })
    }

    fn write(
        docs: &mut BTreeMap<DocumentPath, Entry>,
        path: &DocumentPath,
        document: Bytes,
    ) -> u64 {
        let version = docs.get(path).map_or(1, |e| e.version + 1);
        docs.insert(path.clone(), Entry { document, version });
        version
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Bytes>, StoreError> {
        Ok(self.lock()?.get(path).map(|e| e.document.clone()))
    }

    async fn create(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        let mut docs = self.lock()?;
        if docs.contains_key(path) {
            return Err(StoreError::AlreadyExists { path: path.clone() });
        }
        Self::write(&mut docs, path, document);
        Ok(())
    }

    async fn put(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        let mut docs = self.lock()?;
        Self::write(&mut docs, path, document);
        Ok(())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Bytes>, StoreError> {
        let docs = self.lock()?;
        Ok(docs
            .iter()
            .filter(|(path, _)| path.collection == collection)
            .map(|(_, e)| e.document.clone())
            .collect())
    }

    async fn commit(
        &self,
        user_id: &str,
        mutation: &Mutation,
    ) -> Result<CommitOutcome, StoreError> {
        let path = DocumentPath::user(user_id);
        let mut docs = self.lock()?;

        let entry = docs.get(&path).ok_or_else(|| StoreError::NotFound { path: path.clone() })?;
        let mut account: UserAccount = decode(&entry.document)?;

        let changed = mutation.apply(&mut account)?;
        let version = Self::write(&mut docs, &path, encode(&account)?);

        Ok(CommitOutcome { account, changed, version })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{Condition, FieldOp, records};

    async fn store_with_account(balance: u64) -> MemoryStore {
        let store = MemoryStore::new();
        let account = UserAccount::new("u1", "Ada", balance, "avatar_default");
        store.create(&DocumentPath::user("u1"), encode(&account).unwrap()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn create_rejects_existing_document() {
        let store = store_with_account(0).await;
        let account = UserAccount::new("u1", "Other", 5, "avatar_default");

        let result = store.create(&DocumentPath::user("u1"), encode(&account).unwrap()).await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
        let stored = records::fetch_account(&store, "u1").await.unwrap();
        assert_eq!(stored.display_name, "Ada");
    }

    #[tokio::test]
    async fn commit_on_missing_account_is_not_found() {
        let store = MemoryStore::new();
        let mutation = Mutation::new().then(FieldOp::Credit(10));

        let result = store.commit("ghost", &mutation).await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn commit_bumps_version_and_persists() {
        let store = store_with_account(100).await;
        let path = DocumentPath::user("u1");
        assert_eq!(store.version(&path), Some(1));

        let outcome = store.commit("u1", &Mutation::new().then(FieldOp::Credit(25))).await.unwrap();

        assert_eq!(outcome.version, 2);
        assert_eq!(outcome.account.currency_balance, 125);
        assert_eq!(records::fetch_account(&store, "u1").await.unwrap().currency_balance, 125);
    }

    #[tokio::test]
    async fn rejected_commit_leaves_document_untouched() {
        let store = store_with_account(400).await;
        let path = DocumentPath::user("u1");
        let mutation = Mutation::new()
            .require(Condition::BalanceAtLeast(500))
            .then(FieldOp::Debit(500))
            .then(FieldOp::GrantCosmetic("avatar_astronaut".into()));

        let result = store.commit("u1", &mutation).await;

        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert_eq!(store.version(&path), Some(1));
        let account = records::fetch_account(&store, "u1").await.unwrap();
        assert_eq!(account.currency_balance, 400);
        assert!(!account.owns("avatar_astronaut"));
    }

    #[tokio::test]
    async fn list_filters_by_collection_in_id_order() {
        let store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            let path = DocumentPath::new(Collection::Avatars, id);
            store.put(&path, Bytes::from(id.as_bytes().to_vec())).await.unwrap();
        }
        let level = DocumentPath::new(Collection::Levels, "x");
        store.put(&level, Bytes::from_static(b"x")).await.unwrap();

        let avatars = store.list(Collection::Avatars).await.unwrap();

        let expected: Vec<Bytes> =
            [b"a", b"b", b"c"].iter().map(|id| Bytes::from_static(*id)).collect();
        assert_eq!(avatars, expected);
    }

    #[tokio::test]
    async fn clones_share_documents() {
        let store = store_with_account(0).await;
        let device = store.clone();

        device.commit("u1", &Mutation::new().then(FieldOp::Credit(7))).await.unwrap();

        assert_eq!(records::fetch_account(&store, "u1").await.unwrap().currency_balance, 7);
    }
}
