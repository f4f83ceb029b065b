// libs/appointment-cell/src/store.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared_store::InMemoryStore;

use crate::models::{Appointment, AppointmentStatus};

/// Repository boundary the engine books against. Implementations must make
/// a read-then-write sequence performed under the engine's per-doctor lock
/// linearizable with respect to other holders of the same lock. Result
/// ordering is repository-defined; the engine does not rely on it.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn save(&self, appointment: Appointment) -> Appointment;
    async fn find_by_id(&self, id: Uuid) -> Option<Appointment>;
    async fn find_by_patient_id(&self, patient_id: Uuid) -> Vec<Appointment>;
    async fn find_by_doctor_id(&self, doctor_id: Uuid) -> Vec<Appointment>;
    /// Appointments whose start instant falls in the half-open range
    /// `[start, end)`.
    async fn find_by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Vec<Appointment>;
}

/// In-memory appointment store: the generic keyed store plus scan-based
/// filtered lookups.
pub struct InMemoryAppointmentRepository {
    store: InMemoryStore<Appointment>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
        }
    }

    pub async fn count_active(&self) -> usize {
        self.store
            .find_matching(|apt| apt.status != AppointmentStatus::Cancelled)
            .await
            .len()
    }
}

impl Default for InMemoryAppointmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn save(&self, appointment: Appointment) -> Appointment {
        self.store.save(appointment).await
    }

    async fn find_by_id(&self, id: Uuid) -> Option<Appointment> {
        self.store.find_by_id(id).await
    }

    async fn find_by_patient_id(&self, patient_id: Uuid) -> Vec<Appointment> {
        self.store
            .find_matching(|apt| apt.patient_id == patient_id)
            .await
    }

    async fn find_by_doctor_id(&self, doctor_id: Uuid) -> Vec<Appointment> {
        self.store
            .find_matching(|apt| apt.doctor_id == doctor_id)
            .await
    }

    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Appointment> {
        self.store
            .find_matching(|apt| start <= apt.start_time && apt.start_time < end)
            .await
    }
}
