//! Typed record access on top of raw documents.

use orrery_proto::{DocumentPath, Record, UserAccount, decode, encode};

use super::{Store, StoreError};

/// Load one record by id.
pub async fn fetch<T, S>(store: &S, id: &str) -> Result<Option<T>, StoreError>
where
    T: Record,
    S: Store + ?Sized,
{
    let path = DocumentPath::new(T::COLLECTION, id);
    match store.get(&path).await? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

/// Load every record of `T`'s collection, ordered by id.
pub async fn fetch_all<T, S>(store: &S) -> Result<Vec<T>, StoreError>
where
    T: Record,
    S: Store + ?Sized,
{
    let documents = store.list(T::COLLECTION).await?;
    documents.iter().map(|bytes| decode(bytes).map_err(StoreError::from)).collect()
}

/// Write a record unconditionally.
pub async fn save<T, S>(store: &S, record: &T) -> Result<(), StoreError>
where
    T: Record + Sync,
    S: Store + ?Sized,
{
    let document = encode(record)?;
    store.put(&record.path(), document).await
}

/// Load a user account.
///
/// # Errors
///
/// Returns `StoreError::NotFound` if the account does not exist.
pub async fn fetch_account<S>(store: &S, user_id: &str) -> Result<UserAccount, StoreError>
where
    S: Store + ?Sized,
{
    fetch(store, user_id)
        .await?
        .ok_or_else(|| StoreError::NotFound { path: DocumentPath::user(user_id) })
}
