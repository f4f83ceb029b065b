// libs/doctor-cell/src/models.rs
use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::HasId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
    Blocked,
}

/// An indivisible time interval in a doctor's schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SlotStatus,
}

impl TimeSlot {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Result<Self> {
        Self::with_status(start_time, end_time, SlotStatus::Available)
    }

    pub fn with_status(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: SlotStatus,
    ) -> Result<Self> {
        if start_time >= end_time {
            return Err(anyhow!("slot start time must be before end time"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            start_time,
            end_time,
            status,
        })
    }

    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    /// Book this slot. Succeeds only from `Available`; calling on any other
    /// status is a no-op that returns false.
    pub fn book(&mut self) -> bool {
        if self.status == SlotStatus::Available {
            self.status = SlotStatus::Booked;
            return true;
        }
        false
    }

    /// Release a booked slot back to `Available`.
    pub fn release(&mut self) -> bool {
        if self.status == SlotStatus::Booked {
            self.status = SlotStatus::Available;
            return true;
        }
        false
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Half-open containment: start inclusive, end exclusive.
    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.start_time <= instant && instant < self.end_time
    }
}

/// A working-hour window within a single day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WorkingHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start >= end {
            return Err(anyhow!("working hours start must be before end"));
        }
        Ok(Self { start, end })
    }

    fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Per-doctor aggregation of working-hour windows, blocked intervals and
/// bookable slots. Never owns appointments; the booking engine queries it
/// for point-in-time availability only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub doctor_id: Uuid,
    pub working_hours: HashMap<Weekday, WorkingHours>,
    pub blocked_slots: Vec<TimeSlot>,
    pub available_slots: Vec<TimeSlot>,
    pub last_updated: DateTime<Utc>,
}

impl Schedule {
    pub fn new(doctor_id: Uuid) -> Self {
        Self {
            doctor_id,
            working_hours: HashMap::new(),
            blocked_slots: Vec::new(),
            available_slots: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn set_working_hours(&mut self, day: Weekday, hours: WorkingHours) {
        self.working_hours.insert(day, hours);
        self.last_updated = Utc::now();
    }

    /// Add a bookable slot to the schedule.
    pub fn add_available_slot(&mut self, slot: TimeSlot) {
        self.available_slots.push(slot);
        self.last_updated = Utc::now();
    }

    /// Block an interval. Any available slot with the same id is removed so
    /// the two collections stay in lockstep.
    pub fn add_blocked_time(&mut self, mut slot: TimeSlot) {
        slot.status = SlotStatus::Blocked;
        self.available_slots.retain(|s| s.id != slot.id);
        self.blocked_slots.push(slot);
        self.last_updated = Utc::now();
    }

    /// Unblock the interval with the given slot id, returning it to the
    /// available collection. Returns false if no such blocked slot exists.
    pub fn remove_blocked_time(&mut self, slot_id: Uuid) -> bool {
        let Some(position) = self.blocked_slots.iter().position(|s| s.id == slot_id) else {
            return false;
        };

        let mut slot = self.blocked_slots.remove(position);
        slot.status = SlotStatus::Available;
        self.available_slots.push(slot);
        self.last_updated = Utc::now();
        true
    }

    /// A given instant is available only if its weekday has a configured
    /// working-hour window, its time-of-day falls inside that window, and it
    /// is not covered by any blocked interval. All containment checks use
    /// the half-open `[start, end)` convention.
    pub fn check_availability(&self, instant: DateTime<Utc>) -> bool {
        let Some(hours) = self.working_hours.get(&instant.weekday()) else {
            return false;
        };

        if !hours.contains(instant.time()) {
            return false;
        }

        !self.blocked_slots.iter().any(|blocked| blocked.covers(instant))
    }

    /// Available slots whose start falls on the given calendar date.
    pub fn available_slots_on(&self, date: NaiveDate) -> Vec<&TimeSlot> {
        self.available_slots
            .iter()
            .filter(|slot| slot.start_time.date_naive() == date)
            .collect()
    }
}

impl HasId for Schedule {
    fn id(&self) -> Uuid {
        self.doctor_id
    }
}
