// libs/appointment-cell/src/services/locks.rs
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Per-doctor exclusion scopes. Admission decisions for one doctor are a
/// check-then-act sequence over that doctor's appointment set, so the engine
/// holds this lock from the first read to the final write. Different doctors
/// proceed fully concurrently; pure reads never take a lock.
pub struct DoctorLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl DoctorLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the exclusion scope for one doctor, creating it on first use.
    /// The guard is owned so it can be held across await points.
    pub async fn acquire(&self, doctor_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(doctor_id).or_default())
        };

        debug!("Acquiring scheduling lock for doctor {}", doctor_id);
        lock.lock_owned().await
    }
}

impl Default for DoctorLocks {
    fn default() -> Self {
        Self::new()
    }
}
