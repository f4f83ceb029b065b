// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::HasId;

// ==============================================================================
// CORE APPOINTMENT MODEL
// ==============================================================================

/// The booking record. Holds patient/doctor identifiers only, never the
/// entities themselves; all state transitions go through the booking engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(
        patient_id: Uuid,
        doctor_id: Uuid,
        start_time: DateTime<Utc>,
        duration_minutes: i32,
        appointment_type: AppointmentType,
    ) -> Result<Self, AppointmentError> {
        if duration_minutes <= 0 {
            return Err(AppointmentError::InvalidDuration {
                minutes: duration_minutes,
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            start_time,
            duration_minutes,
            appointment_type,
            status: AppointmentStatus::Scheduled,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Scheduled end instant: start plus duration.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(self.duration_minutes as i64)
    }

    /// Calendar date of the start instant (UTC truncation), the unit the
    /// daily quota is counted over.
    pub fn scheduled_date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    /// Confirm the appointment. Valid only from `Scheduled`; no-op returning
    /// false from any other state.
    pub fn confirm(&mut self) -> bool {
        if self.status != AppointmentStatus::Scheduled {
            return false;
        }
        self.status = AppointmentStatus::Confirmed;
        self.updated_at = Utc::now();
        true
    }

    /// Cancel with a reason, appended to the notes for the audit trail.
    /// No-op returning false once a terminal status has been reached.
    pub fn cancel(&mut self, reason: &str) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = AppointmentStatus::Cancelled;
        self.notes.push_str(&format!("\nCancellation reason: {}", reason));
        self.updated_at = Utc::now();
        true
    }

    /// Move the start instant, keeping the duration. No-op returning false
    /// from terminal states. Engine-level admission rules are re-checked by
    /// the booking engine, not here.
    pub fn reschedule(&mut self, new_start_time: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.start_time = new_start_time;
        self.updated_at = Utc::now();
        true
    }
}

impl HasId for Appointment {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    /// Terminal statuses admit no further transition or mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Regular,
    FollowUp,
    Emergency,
    Consultation,
    Procedure,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Regular => write!(f, "regular"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
            AppointmentType::Emergency => write!(f, "emergency"),
            AppointmentType::Consultation => write!(f, "consultation"),
            AppointmentType::Procedure => write!(f, "procedure"),
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Tagged admission-control failures. Every variant names the rule that
/// rejected the request and carries the identifiers needed for a precise
/// caller-facing message. All are recoverable by resubmitting corrected
/// input; none are fatal to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Patient {patient_id} not found")]
    PatientNotFound { patient_id: Uuid },

    #[error("Doctor {doctor_id} not found")]
    DoctorNotFound { doctor_id: Uuid },

    #[error("Appointment {appointment_id} not found")]
    AppointmentNotFound { appointment_id: Uuid },

    #[error("Appointment time {requested} is in the past")]
    PastTime { requested: DateTime<Utc> },

    #[error("Appointments must be booked at least {required_hours} hours in advance")]
    InsufficientLeadTime { required_hours: i64 },

    #[error("Doctor {doctor_id} is already booked for this time slot")]
    DoctorUnavailable { doctor_id: Uuid },

    #[error("Patient {patient_id} cannot hold more than {limit} appointments on {date}")]
    DailyQuotaExceeded {
        patient_id: Uuid,
        date: NaiveDate,
        limit: usize,
    },

    #[error("Cancellations must be made at least {required_hours} hours before the appointment")]
    CancellationWindowViolated { required_hours: i64 },

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment duration must be positive, got {minutes} minutes")]
    InvalidDuration { minutes: i32 },
}
