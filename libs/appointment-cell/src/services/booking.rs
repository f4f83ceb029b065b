// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::BookingPolicy;
use shared_models::{Doctor, Patient};
use shared_store::KeyedStore;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::locks::DoctorLocks;
use crate::store::AppointmentRepository;

/// The booking engine: single authority for whether an appointment may be
/// created, modified or cancelled. Validation is side-effect-free; each
/// operation mutates the store only on its one success path, after every
/// check has passed.
///
/// `create`/`update`/`cancel` serialize per doctor so the read-validate-write
/// sequence cannot race a concurrent admission for the same doctor. Reads
/// take no lock.
pub struct AppointmentBookingService {
    appointments: Arc<dyn AppointmentRepository>,
    patients: Arc<dyn KeyedStore<Patient>>,
    doctors: Arc<dyn KeyedStore<Doctor>>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    doctor_locks: DoctorLocks,
    policy: BookingPolicy,
}

impl AppointmentBookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        patients: Arc<dyn KeyedStore<Patient>>,
        doctors: Arc<dyn KeyedStore<Doctor>>,
        policy: BookingPolicy,
    ) -> Self {
        let conflict_service = ConflictDetectionService::new(Arc::clone(&appointments));

        Self {
            appointments,
            patients,
            doctors,
            conflict_service,
            lifecycle_service: AppointmentLifecycleService::new(),
            doctor_locks: DoctorLocks::new(),
            policy,
        }
    }

    /// Admit a new appointment. Checks run in order, each failing fast with
    /// its own error: referential existence, temporal validity, lead time,
    /// doctor overlap, patient daily quota. On success the candidate is
    /// persisted with status `Scheduled` and returned.
    pub async fn create_appointment(
        &self,
        candidate: Appointment,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            candidate.patient_id, candidate.doctor_id
        );

        let _guard = self.doctor_locks.acquire(candidate.doctor_id).await;

        self.verify_patient_exists(candidate.patient_id).await?;
        self.verify_doctor_exists(candidate.doctor_id).await?;

        let now = Utc::now();
        self.validate_start_time(candidate.start_time, now)?;
        self.ensure_no_doctor_overlap(&candidate, None).await?;
        self.ensure_daily_quota(&candidate, None).await?;

        let mut admitted = candidate;
        admitted.status = AppointmentStatus::Scheduled;
        let saved = self.appointments.save(admitted).await;

        info!(
            "Appointment {} booked for doctor {} at {}",
            saved.id, saved.doctor_id, saved.start_time
        );
        Ok(saved)
    }

    /// Update an existing appointment. A changed start instant is
    /// re-validated in full: temporal validity, lead time, and the doctor
    /// overlap check with the appointment excluded from its own comparison.
    /// A changed doctor re-runs the existence and overlap checks against the
    /// new doctor's calendar; a changed patient re-runs existence and quota.
    /// The daily quota is also re-checked when the calendar date moved. A
    /// requested status change must be a legal transition.
    pub async fn update_appointment(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment: {}", appointment.id);

        // The overlap check targets the appointment's (possibly new) doctor,
        // so that is the calendar to serialize on.
        let _guard = self.doctor_locks.acquire(appointment.doctor_id).await;

        let existing = self.find_required(appointment.id).await?;

        if appointment.status != existing.status {
            self.lifecycle_service
                .validate_status_transition(existing.status, appointment.status)?;
        }

        let start_changed = appointment.start_time != existing.start_time;
        let doctor_changed = appointment.doctor_id != existing.doctor_id;
        let patient_changed = appointment.patient_id != existing.patient_id;

        if patient_changed {
            self.verify_patient_exists(appointment.patient_id).await?;
        }
        if doctor_changed {
            self.verify_doctor_exists(appointment.doctor_id).await?;
        }

        if start_changed {
            self.validate_start_time(appointment.start_time, Utc::now())?;
        }
        if start_changed || doctor_changed {
            self.ensure_no_doctor_overlap(&appointment, Some(appointment.id))
                .await?;
        }
        if patient_changed || appointment.scheduled_date() != existing.scheduled_date() {
            self.ensure_daily_quota(&appointment, Some(appointment.id))
                .await?;
        }

        let saved = self.appointments.save(appointment).await;
        info!("Appointment {} updated", saved.id);
        Ok(saved)
    }

    /// Confirm a scheduled appointment.
    pub async fn confirm_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Confirming appointment: {}", appointment_id);

        let (_guard, mut appointment) = self.lock_doctor_for(appointment_id).await?;
        if !appointment.confirm() {
            return Err(AppointmentError::InvalidStatusTransition {
                from: appointment.status,
                to: AppointmentStatus::Confirmed,
            });
        }

        Ok(self.appointments.save(appointment).await)
    }

    /// Move an appointment to a new start instant, duration unchanged. The
    /// new time passes the same admission checks as a fresh booking, with
    /// the appointment excluded from its own overlap comparison.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        new_start_time: DateTime<Utc>,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Rescheduling appointment {} to {}",
            appointment_id, new_start_time
        );

        let (_guard, mut appointment) = self.lock_doctor_for(appointment_id).await?;
        let previous_date = appointment.scheduled_date();

        let now = Utc::now();
        self.validate_start_time(new_start_time, now)?;

        if !appointment.reschedule(new_start_time) {
            return Err(AppointmentError::InvalidStatusTransition {
                from: appointment.status,
                to: appointment.status,
            });
        }

        self.ensure_no_doctor_overlap(&appointment, Some(appointment.id))
            .await?;
        if appointment.scheduled_date() != previous_date {
            self.ensure_daily_quota(&appointment, Some(appointment.id))
                .await?;
        }

        Ok(self.appointments.save(appointment).await)
    }

    /// Cancel an appointment. The stored start instant must still be at
    /// least the policy's cancellation window away from now; otherwise the
    /// stored record is left untouched.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        reason: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let (_guard, mut appointment) = self.lock_doctor_for(appointment_id).await?;

        let now = Utc::now();
        let window = Duration::hours(self.policy.cancellation_window_hours);
        if appointment.start_time < now + window {
            warn!(
                "Cancellation window violated for appointment {} starting {}",
                appointment_id, appointment.start_time
            );
            return Err(AppointmentError::CancellationWindowViolated {
                required_hours: self.policy.cancellation_window_hours,
            });
        }

        if !appointment.cancel(reason) {
            return Err(AppointmentError::InvalidStatusTransition {
                from: appointment.status,
                to: AppointmentStatus::Cancelled,
            });
        }

        let saved = self.appointments.save(appointment).await;
        info!("Appointment {} cancelled", saved.id);
        Ok(saved)
    }

    // ==============================================================================
    // READ-ONLY QUERIES (no locking, repository-defined order)
    // ==============================================================================

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        self.find_required(appointment_id).await
    }

    pub async fn appointments_for_patient(&self, patient_id: Uuid) -> Vec<Appointment> {
        self.appointments.find_by_patient_id(patient_id).await
    }

    pub async fn appointments_for_doctor(&self, doctor_id: Uuid) -> Vec<Appointment> {
        self.appointments.find_by_doctor_id(doctor_id).await
    }

    pub async fn appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Appointment> {
        self.appointments.find_by_date_range(start, end).await
    }

    // ==============================================================================
    // PRIVATE HELPERS
    // ==============================================================================

    /// Look up the appointment to learn which doctor's scope to lock, then
    /// re-read it under the lock so the returned record reflects any write
    /// that finished while we waited.
    async fn lock_doctor_for(
        &self,
        appointment_id: Uuid,
    ) -> Result<(OwnedMutexGuard<()>, Appointment), AppointmentError> {
        let existing = self.find_required(appointment_id).await?;
        let guard = self.doctor_locks.acquire(existing.doctor_id).await;
        let appointment = self.find_required(appointment_id).await?;
        Ok((guard, appointment))
    }

    async fn find_required(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .find_by_id(appointment_id)
            .await
            .ok_or(AppointmentError::AppointmentNotFound { appointment_id })
    }

    async fn verify_patient_exists(&self, patient_id: Uuid) -> Result<(), AppointmentError> {
        self.patients
            .find_by_id(patient_id)
            .await
            .map(|_| ())
            .ok_or(AppointmentError::PatientNotFound { patient_id })
    }

    async fn verify_doctor_exists(&self, doctor_id: Uuid) -> Result<(), AppointmentError> {
        self.doctors
            .find_by_id(doctor_id)
            .await
            .map(|_| ())
            .ok_or(AppointmentError::DoctorNotFound { doctor_id })
    }

    /// Temporal validity and lead time, in that order.
    fn validate_start_time(
        &self,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentError> {
        if start_time <= now {
            return Err(AppointmentError::PastTime {
                requested: start_time,
            });
        }

        let lead_time = Duration::hours(self.policy.min_lead_time_hours);
        if start_time < now + lead_time {
            return Err(AppointmentError::InsufficientLeadTime {
                required_hours: self.policy.min_lead_time_hours,
            });
        }

        Ok(())
    }

    async fn ensure_no_doctor_overlap(
        &self,
        candidate: &Appointment,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        let conflicts = self
            .conflict_service
            .find_doctor_conflicts(
                candidate.doctor_id,
                candidate.start_time,
                candidate.end_time(),
                exclude_appointment_id,
            )
            .await;

        if !conflicts.is_empty() {
            return Err(AppointmentError::DoctorUnavailable {
                doctor_id: candidate.doctor_id,
            });
        }

        Ok(())
    }

    async fn ensure_daily_quota(
        &self,
        candidate: &Appointment,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        let date = candidate.scheduled_date();
        let booked = self
            .conflict_service
            .count_patient_appointments_on(candidate.patient_id, date, exclude_appointment_id)
            .await;

        if booked >= self.policy.max_appointments_per_day {
            warn!(
                "Daily quota reached for patient {} on {} ({} booked)",
                candidate.patient_id, date, booked
            );
            return Err(AppointmentError::DailyQuotaExceeded {
                patient_id: candidate.patient_id,
                date,
                limit: self.policy.max_appointments_per_day,
            });
        }

        Ok(())
    }
}
