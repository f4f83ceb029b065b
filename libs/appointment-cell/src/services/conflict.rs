// libs/appointment-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus};
use crate::store::AppointmentRepository;

/// Overlap and quota rules. Pure comparison over the appointment sets the
/// repository returns; the booking engine turns findings into tagged errors.
pub struct ConflictDetectionService {
    appointments: Arc<dyn AppointmentRepository>,
}

impl ConflictDetectionService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    /// The doctor's non-cancelled appointments whose `[start, end)` interval
    /// intersects the candidate interval. `exclude_appointment_id` omits the
    /// appointment being rescheduled from its own conflict check.
    pub async fn find_doctor_conflicts(
        &self,
        doctor_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Vec<Appointment> {
        debug!(
            "Checking conflicts for doctor {} from {} to {}",
            doctor_id, start_time, end_time
        );

        let conflicts: Vec<Appointment> = self
            .appointments
            .find_by_doctor_id(doctor_id)
            .await
            .into_iter()
            .filter(|apt| Some(apt.id) != exclude_appointment_id)
            .filter(|apt| apt.status != AppointmentStatus::Cancelled)
            .filter(|apt| intervals_overlap(start_time, end_time, apt.start_time, apt.end_time()))
            .collect();

        if !conflicts.is_empty() {
            warn!(
                "Conflict detected for doctor {} - {} overlapping appointments",
                doctor_id,
                conflicts.len()
            );
        }

        conflicts
    }

    /// Count of the patient's non-cancelled appointments on one calendar
    /// date (UTC truncation of the start instant).
    pub async fn count_patient_appointments_on(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
        exclude_appointment_id: Option<Uuid>,
    ) -> usize {
        self.appointments
            .find_by_patient_id(patient_id)
            .await
            .into_iter()
            .filter(|apt| Some(apt.id) != exclude_appointment_id)
            .filter(|apt| apt.status != AppointmentStatus::Cancelled)
            .filter(|apt| apt.scheduled_date() == date)
            .count()
    }
}

/// Two half-open intervals `[start1, end1)` and `[start2, end2)` intersect
/// iff each starts before the other ends. Appointments that merely touch at
/// a boundary do not overlap.
pub fn intervals_overlap(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}
