//! Entity store contract consumed by the ledger plus an in-memory backend.

mod mem_store;
mod record;

pub use mem_store::MemStore;
pub use record::{Entity, EntityKind, Record};

use async_trait::async_trait;
use futures::future::try_join_all;
use std::{collections::HashMap, io, path::PathBuf, sync::Arc};

pub type StoreResult<T> = Result<T, StoreError>;
pub type DynStore = Arc<dyn EntityStore>;

/// Async key-value access over the four entity kinds.
///
/// Writes issued by one caller must become visible in the order they were
/// issued. Timeouts and retries are the backend's concern.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get(&self, kind: EntityKind, key: &str) -> StoreResult<Option<Record>>;
    async fn set(&self, record: Record) -> StoreResult<()>;

    /// Reads every key concurrently; absent keys are left out of the map.
    async fn get_many(
        &self,
        kind: EntityKind,
        keys: &[String],
    ) -> StoreResult<HashMap<String, Record>> {
        let reads = keys.iter().map(|key| async move {
            let found = self.get(kind, key).await?;
            Ok::<_, StoreError>(found.map(|record| (key.clone(), record)))
        });
        Ok(try_join_all(reads).await?.into_iter().flatten().collect())
    }

    /// Writes `record` only when nothing is stored under its key yet.
    async fn insert_if_absent(&self, record: Record) -> StoreResult<bool> {
        if self.get(record.kind(), record.id()).await?.is_some() {
            return Ok(false);
        }
        self.set(record).await?;
        Ok(true)
    }
}

#[async_trait]
impl<T: EntityStore + ?Sized> EntityStore for Arc<T> {
    async fn get(&self, kind: EntityKind, key: &str) -> StoreResult<Option<Record>> {
        (**self).get(kind, key).await
    }

    async fn set(&self, record: Record) -> StoreResult<()> {
        (**self).set(record).await
    }

    async fn get_many(
        &self,
        kind: EntityKind,
        keys: &[String],
    ) -> StoreResult<HashMap<String, Record>> {
        (**self).get_many(kind, keys).await
    }

    async fn insert_if_absent(&self, record: Record) -> StoreResult<bool> {
        (**self).insert_if_absent(record).await
    }
}

/// Typed batch read over [`EntityStore::get_many`].
pub async fn load_many<E, S>(store: &S, keys: &[String]) -> StoreResult<HashMap<String, E>>
where
    E: Entity,
    S: EntityStore + ?Sized,
{
    let rows = store.get_many(E::KIND, keys).await?;
    rows.into_iter()
        .map(|(key, record)| {
            let found = record.kind();
            match E::from_record(record) {
                Some(entity) => Ok((key, entity)),
                None => Err(StoreError::KindMismatch {
                    key,
                    expected: E::KIND,
                    found,
                }),
            }
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record '{key}' is a {found:?}, expected {expected:?}")]
    KindMismatch {
        key: String,
        expected: EntityKind,
        found: EntityKind,
    },
    #[error("backend error: {0}")]
    Backend(String),
}

pub(crate) fn io_error(path: impl Into<PathBuf>, err: io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source: err,
    }
}
