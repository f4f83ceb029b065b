pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

/// Narrow keyed-store boundary the cells program against. One concrete store
/// per entity type; richer lookups (by doctor, by patient, by date range)
/// live on the entity's own repository, composed on top of this.
#[async_trait]
pub trait KeyedStore<T>: Send + Sync {
    async fn save(&self, record: T) -> T;
    async fn find_by_id(&self, id: Uuid) -> Option<T>;
    async fn find_all(&self) -> Vec<T>;
    async fn delete(&self, id: Uuid) -> bool;
}
