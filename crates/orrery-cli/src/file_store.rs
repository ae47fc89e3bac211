//! File-backed document store.
//!
//! One CBOR file per document at `<root>/<collection>/<id>.cbor`. Every write
//! goes to a uniquely named temporary file that is synced and then renamed
//! into place, so a crash never leaves a half-written document behind.
//!
//! Writers take an exclusive lock on `<root>/.lock` for the whole
//! read-apply-write, which serializes handles in this process and in other
//! processes alike. Readers never lock.
//!
//! # Invariants
//!
//! - Commits and creates on one data directory are serialized by its lock file
//! - A document id never escapes its collection directory

use std::{
    collections::BTreeMap,
    fs::{File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use bytes::Bytes;
use orrery_core::{CommitOutcome, Mutation, Store, StoreError};
use orrery_proto::{Collection, DocumentPath, UserAccount, decode, encode};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

const EXTENSION: &str = "cbor";

/// Lock file guarding every write under the data directory.
const LOCK_FILE: &str = ".lock";

/// Store keeping documents as files under a data directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    /// Commit counters per document, counted since this handle was opened.
    versions: Mutex<BTreeMap<DocumentPath, u64>>,
}

impl FileStore {
    /// Open (or lazily create) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), versions: Mutex::new(BTreeMap::new()) }
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `write` on the blocking pool while holding the data directory lock.
    async fn locked<T, F>(&self, write: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    {
        let root = self.root.clone();
        let task = tokio::task::spawn_blocking(move || {
            let _lock = lock(&root)?;
            write()
        });

        task.await.map_err(|e| {
            tracing::warn!("Store write task failed: {}", e);
            StoreError::Unavailable { reason: format!("write task: {e}") }
        })?
    }
}

fn file_path(root: &Path, path: &DocumentPath) -> Result<PathBuf, StoreError> {
    let id = path.id.as_str();
    let valid =
        !id.is_empty() && !id.starts_with('.') && !id.contains(['/', '\\']) && !id.contains('\0');
    if !valid {
        return Err(StoreError::InvalidPath { path: path.clone() });
    }

    Ok(root.join(path.collection.name()).join(format!("{id}.{EXTENSION}")))
}

/// Take the exclusive lock on the data directory. Released when the file drops.
fn lock(root: &Path) -> Result<File, StoreError> {
    std::fs::create_dir_all(root).map_err(|e| io_error("create", root, &e))?;

    let path = root.join(LOCK_FILE);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .map_err(|e| io_error("open", &path, &e))?;
    fs2::FileExt::lock_exclusive(&file).map_err(|e| io_error("lock", &path, &e))?;
    Ok(file)
}

fn read_file(file: &Path) -> Result<Option<Bytes>, StoreError> {
    match std::fs::read(file) {
        Ok(data) => Ok(Some(Bytes::from(data))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error("read", file, &e)),
    }
}

fn write_file(file: &Path, document: &[u8]) -> Result<(), StoreError> {
    let dir = file.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| io_error("create", dir, &e))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| io_error("create", dir, &e))?;
    temp.write_all(document).map_err(|e| io_error("write", temp.path(), &e))?;
    temp.as_file().sync_all().map_err(|e| io_error("sync", temp.path(), &e))?;
    temp.persist(file).map_err(|e| io_error("rename", file, &e.error))?;
    Ok(())
}

fn io_error(operation: &str, file: &Path, err: &std::io::Error) -> StoreError {
    tracing::warn!("Failed to {} {}: {}", operation, file.display(), err);
    StoreError::Unavailable { reason: format!("{operation} {}: {err}", file.display()) }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Bytes>, StoreError> {
        let file = file_path(&self.root, path)?;
        match tokio::fs::read(&file).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", &file, &e)),
        }
    }

    async fn create(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        let file = file_path(&self.root, path)?;
        let mut versions = self.versions.lock().await;

        let existing = path.clone();
        self.locked(move || {
            if read_file(&file)?.is_some() {
                return Err(StoreError::AlreadyExists { path: existing });
            }
            write_file(&file, &document)
        })
        .await?;

        versions.insert(path.clone(), 1);
        Ok(())
    }

    async fn put(&self, path: &DocumentPath, document: Bytes) -> Result<(), StoreError> {
        let file = file_path(&self.root, path)?;
        let mut versions = self.versions.lock().await;

        self.locked(move || write_file(&file, &document)).await?;

        *versions.entry(path.clone()).or_insert(0) += 1;
        Ok(())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Bytes>, StoreError> {
        let dir = self.root.join(collection.name());
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list", &dir, &e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error("list", &dir, &e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                files.push(path);
            }
        }
        files.sort();

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let data = tokio::fs::read(&file).await.map_err(|e| io_error("read", &file, &e))?;
            documents.push(Bytes::from(data));
        }
        Ok(documents)
    }

    async fn commit(
        &self,
        user_id: &str,
        mutation: &Mutation,
    ) -> Result<CommitOutcome, StoreError> {
        let path = DocumentPath::user(user_id);
        let file = file_path(&self.root, &path)?;
        let mut versions = self.versions.lock().await;

        let missing = path.clone();
        let mutation = mutation.clone();
        let (account, changed) = self
            .locked(move || {
                let document = read_file(&file)?.ok_or(StoreError::NotFound { path: missing })?;
                let mut account: UserAccount = decode(&document)?;

                let changed = mutation.apply(&mut account)?;
                write_file(&file, &encode(&account)?)?;
                Ok((account, changed))
            })
            .await?;

        let version = versions.entry(path).or_insert(0);
        *version += 1;
        Ok(CommitOutcome { account, changed, version: *version })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use orrery_core::{Condition, EconomyService, FieldOp, ServiceError, store::records};

    use super::*;

    async fn store_with_account(dir: &Path, balance: u64) -> FileStore {
        let store = FileStore::open(dir);
        let account = UserAccount::new("u1", "Ada", balance, "avatar_default");
        store.create(&DocumentPath::user("u1"), encode(&account).unwrap()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_account(dir.path(), 10).await;
        store.commit("u1", &Mutation::new().then(FieldOp::Credit(5))).await.unwrap();

        let reopened = FileStore::open(dir.path());
        let account = records::fetch_account(&reopened, "u1").await.unwrap();

        assert_eq!(account.currency_balance, 15);
        assert!(dir.path().join("users").join("u1.cbor").exists());
        let leftovers = std::fs::read_dir(dir.path().join("users")).unwrap().count();
        assert_eq!(leftovers, 1, "temporary files left behind");
    }

    #[tokio::test]
    async fn create_refuses_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_account(dir.path(), 0).await;
        let other = UserAccount::new("u1", "Other", 0, "avatar_default");

        let result = store.create(&DocumentPath::user("u1"), encode(&other).unwrap()).await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn rejected_commit_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_account(dir.path(), 400).await;
        let file = dir.path().join("users").join("u1.cbor");
        let before = std::fs::read(&file).unwrap();

        let mutation = Mutation::new()
            .require(Condition::BalanceAtLeast(500))
            .then(FieldOp::Debit(500));
        let result = store.commit("u1", &mutation).await;

        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert_eq!(std::fs::read(&file).unwrap(), before);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id_and_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path());
        for id in ["b", "c", "a"] {
            let path = DocumentPath::new(Collection::Levels, id);
            store.put(&path, Bytes::from(id.as_bytes().to_vec())).await.unwrap();
        }
        std::fs::write(dir.path().join("levels").join("notes.txt"), b"ignored").unwrap();

        let documents = store.list(Collection::Levels).await.unwrap();

        let expected: Vec<Bytes> =
            [b"a", b"b", b"c"].iter().map(|id| Bytes::from_static(*id)).collect();
        assert_eq!(documents, expected);
        assert!(store.list(Collection::Avatars).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_cannot_escape_the_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path());

        for id in ["../evil", "a/b", "", ".hidden"] {
            let result = store.get(&DocumentPath::user(id)).await;
            assert!(matches!(result, Err(StoreError::InvalidPath { .. })), "{id:?} accepted");
        }
    }

    #[tokio::test]
    async fn commit_on_missing_account_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path());

        let result = store.commit("ghost", &Mutation::new().then(FieldOp::Credit(1))).await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn two_handles_never_double_spend() {
        for _ in 0..20 {
            let dir = tempfile::tempdir().unwrap();
            let first = Arc::new(store_with_account(dir.path(), 1000).await);
            let second = Arc::new(FileStore::open(dir.path()));

            let buy = |store: Arc<FileStore>, item: &'static str| {
                tokio::spawn(async move {
                    EconomyService::new().purchase(&*store, "u1", item, 750).await
                })
            };
            let alien = buy(Arc::clone(&first), "avatar_alien");
            let comet = buy(Arc::clone(&second), "avatar_comet");
            let results = [alien.await.unwrap(), comet.await.unwrap()];

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            let failure = results.into_iter().find_map(Result::err);
            assert!(matches!(failure, Some(ServiceError::InsufficientFunds { .. })));

            let account = records::fetch_account(&*second, "u1").await.unwrap();
            assert_eq!(account.currency_balance, 250);
            assert_eq!(account.owned_cosmetic_ids.len(), 2);
        }
    }

    #[tokio::test]
    async fn create_from_second_handle_sees_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let _first = store_with_account(dir.path(), 0).await;
        let second = FileStore::open(dir.path());
        let other = UserAccount::new("u1", "Other", 0, "avatar_default");

        let result = second.create(&DocumentPath::user("u1"), encode(&other).unwrap()).await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
        assert!(dir.path().join(LOCK_FILE).exists());
    }
}
