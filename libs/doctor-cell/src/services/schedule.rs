// libs/doctor-cell/src/services/schedule.rs
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use tracing::debug;
use uuid::Uuid;

use shared_store::InMemoryStore;

use crate::models::{Schedule, TimeSlot, WorkingHours};

/// Manages one `Schedule` per doctor and answers availability queries.
/// All schedule mutation funnels through here; the booking engine and other
/// callers only ever read.
pub struct ScheduleService {
    schedules: InMemoryStore<Schedule>,
}

impl ScheduleService {
    pub fn new() -> Self {
        Self {
            schedules: InMemoryStore::new(),
        }
    }

    /// Create an empty schedule for a doctor. Replaces any existing one.
    pub async fn create_schedule(&self, doctor_id: Uuid) -> Schedule {
        debug!("Creating schedule for doctor {}", doctor_id);
        self.schedules.save(Schedule::new(doctor_id)).await
    }

    pub async fn get_schedule(&self, doctor_id: Uuid) -> Result<Schedule> {
        self.schedules
            .find_by_id(doctor_id)
            .await
            .ok_or_else(|| anyhow!("no schedule found for doctor {}", doctor_id))
    }

    pub async fn set_working_hours(
        &self,
        doctor_id: Uuid,
        day: Weekday,
        hours: WorkingHours,
    ) -> Result<Schedule> {
        let mut schedule = self.get_schedule(doctor_id).await?;
        schedule.set_working_hours(day, hours);
        Ok(self.schedules.save(schedule).await)
    }

    pub async fn add_available_slot(&self, doctor_id: Uuid, slot: TimeSlot) -> Result<Schedule> {
        let mut schedule = self.get_schedule(doctor_id).await?;
        schedule.add_available_slot(slot);
        Ok(self.schedules.save(schedule).await)
    }

    pub async fn add_blocked_time(&self, doctor_id: Uuid, slot: TimeSlot) -> Result<Schedule> {
        debug!(
            "Blocking {} to {} for doctor {}",
            slot.start_time, slot.end_time, doctor_id
        );

        let mut schedule = self.get_schedule(doctor_id).await?;
        schedule.add_blocked_time(slot);
        Ok(self.schedules.save(schedule).await)
    }

    pub async fn remove_blocked_time(&self, doctor_id: Uuid, slot_id: Uuid) -> Result<Schedule> {
        let mut schedule = self.get_schedule(doctor_id).await?;
        if !schedule.remove_blocked_time(slot_id) {
            return Err(anyhow!(
                "no blocked slot {} on schedule for doctor {}",
                slot_id,
                doctor_id
            ));
        }
        Ok(self.schedules.save(schedule).await)
    }

    /// Point-in-time availability query.
    pub async fn check_availability(&self, doctor_id: Uuid, instant: DateTime<Utc>) -> Result<bool> {
        let schedule = self.get_schedule(doctor_id).await?;
        Ok(schedule.check_availability(instant))
    }

    pub async fn available_slots_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<TimeSlot>> {
        let schedule = self.get_schedule(doctor_id).await?;
        Ok(schedule
            .available_slots_on(date)
            .into_iter()
            .cloned()
            .collect())
    }
}

impl Default for ScheduleService {
    fn default() -> Self {
        Self::new()
    }
}
