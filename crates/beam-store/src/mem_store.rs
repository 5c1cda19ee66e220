use crate::{EntityKind, EntityStore, Record, StoreError, StoreResult, io_error};
use async_trait::async_trait;
use std::{collections::BTreeMap, fs, path::Path, sync::Arc};
use tokio::sync::RwLock;

type Rows = BTreeMap<(EntityKind, String), Record>;

/// In-memory backend; clones share the same rows.
///
/// Keeps a log of every accepted write so callers can assert on write order,
/// and can be told to refuse writes for one entity kind.
#[derive(Clone, Default)]
pub struct MemStore {
    rows: Arc<RwLock<Rows>>,
    writes: Arc<RwLock<Vec<(EntityKind, String)>>>,
    failing: Arc<RwLock<Option<EntityKind>>>,
}

impl std::fmt::Debug for MemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemStore")
            .field("rows", &self.rows.try_read().map(|rows| rows.len()).ok())
            .field("writes", &self.writes.try_read().map(|log| log.len()).ok())
            .finish()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let rows: Rows = records
            .into_iter()
            .map(|record| ((record.kind(), record.id().to_string()), record))
            .collect();
        Self {
            rows: Arc::new(RwLock::new(rows)),
            ..Self::default()
        }
    }

    /// Loads a JSON array of records written by [`MemStore::save_json`].
    pub fn load_json(path: &Path) -> StoreResult<Self> {
        let bytes = fs::read(path).map_err(|err| io_error(path, err))?;
        let records: Vec<Record> = serde_json::from_slice(&bytes)?;
        Ok(Self::from_records(records))
    }

    pub async fn save_json(&self, path: &Path) -> StoreResult<()> {
        let records = self.snapshot().await;
        let bytes = serde_json::to_vec_pretty(&records)?;
        fs::write(path, bytes).map_err(|err| io_error(path, err))
    }

    /// Every stored record ordered by kind, then key.
    pub async fn snapshot(&self) -> Vec<Record> {
        self.rows.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Accepted writes in the order they were applied.
    pub async fn write_log(&self) -> Vec<(EntityKind, String)> {
        self.writes.read().await.clone()
    }

    pub async fn clear_write_log(&self) {
        self.writes.write().await.clear();
    }

    /// Makes every subsequent `set` of `kind` fail until reset with `None`.
    pub async fn fail_writes_for(&self, kind: Option<EntityKind>) {
        *self.failing.write().await = kind;
    }
}

#[async_trait]
impl EntityStore for MemStore {
    async fn get(&self, kind: EntityKind, key: &str) -> StoreResult<Option<Record>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&(kind, key.to_string())).cloned())
    }

    async fn set(&self, record: Record) -> StoreResult<()> {
        let kind = record.kind();
        if *self.failing.read().await == Some(kind) {
            return Err(StoreError::Backend(format!(
                "writes of {kind:?} are disabled"
            )));
        }
        let key = record.id().to_string();
        self.rows.write().await.insert((kind, key.clone()), record);
        self.writes.write().await.push((kind, key));
        Ok(())
    }
}
