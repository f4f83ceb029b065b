use std::collections::HashMap;

use async_trait::async_trait;
use shared_models::HasId;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::KeyedStore;

/// Generic in-memory keyed store. Records are keyed by the id the entity
/// reports through `HasId`; `save` is an upsert.
///
/// A read-then-write sequence performed while the caller holds an external
/// exclusion scope (e.g. the booking engine's per-doctor lock) is atomic
/// with respect to other holders of the same scope: each method takes the
/// inner lock for the duration of the call and nothing is buffered.
pub struct InMemoryStore<T> {
    records: RwLock<HashMap<Uuid, T>>,
}

impl<T> InMemoryStore<T>
where
    T: HasId + Clone,
{
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub async fn save(&self, record: T) -> T {
        let id = record.id();
        self.records.write().await.insert(id, record.clone());
        debug!("record {} saved", id);
        record
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<T> {
        self.records.read().await.get(&id).cloned()
    }

    pub async fn find_all(&self) -> Vec<T> {
        self.records.read().await.values().cloned().collect()
    }

    /// Scan returning every record matching the predicate. The richer
    /// per-entity lookups are built from this.
    pub async fn find_matching(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.records
            .read()
            .await
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        self.records.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<T> Default for InMemoryStore<T>
where
    T: HasId + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> KeyedStore<T> for InMemoryStore<T>
where
    T: HasId + Clone + Send + Sync + 'static,
{
    async fn save(&self, record: T) -> T {
        InMemoryStore::save(self, record).await
    }

    async fn find_by_id(&self, id: Uuid) -> Option<T> {
        InMemoryStore::find_by_id(self, id).await
    }

    async fn find_all(&self) -> Vec<T> {
        InMemoryStore::find_all(self).await
    }

    async fn delete(&self, id: Uuid) -> bool {
        InMemoryStore::delete(self, id).await
    }
}
