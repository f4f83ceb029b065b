// libs/doctor-cell/tests/schedule_test.rs
use chrono::{Duration, NaiveTime, TimeZone, Utc, Weekday};
use uuid::Uuid;

use doctor_cell::models::{Schedule, SlotStatus, TimeSlot, WorkingHours};
use doctor_cell::services::ScheduleService;

fn nine_to_five() -> WorkingHours {
    WorkingHours::new(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    )
    .unwrap()
}

// 2025-03-03 is a Monday.
fn monday_at(hour: u32, minute: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, hour, minute, 0).unwrap()
}

// ==============================================================================
// TIME SLOT TRANSITIONS
// ==============================================================================

#[test]
fn slot_requires_ordered_interval() {
    let start = monday_at(10, 0);
    assert!(TimeSlot::new(start, start).is_err());
    assert!(TimeSlot::new(start, start - Duration::minutes(30)).is_err());
    assert!(TimeSlot::new(start, start + Duration::minutes(30)).is_ok());
}

#[test]
fn slot_duration_is_derived_in_minutes() {
    let slot = TimeSlot::new(monday_at(10, 0), monday_at(10, 45)).unwrap();
    assert_eq!(slot.duration_minutes(), 45);
}

#[test]
fn booking_a_slot_twice_is_a_safe_no_op() {
    let mut slot = TimeSlot::new(monday_at(10, 0), monday_at(10, 30)).unwrap();

    assert!(slot.is_available());
    assert!(slot.book());
    assert_eq!(slot.status, SlotStatus::Booked);

    // Idempotent-safe: the second book fails without corrupting state.
    assert!(!slot.book());
    assert_eq!(slot.status, SlotStatus::Booked);
}

#[test]
fn release_only_from_booked() {
    let mut slot = TimeSlot::new(monday_at(10, 0), monday_at(10, 30)).unwrap();

    assert!(!slot.release());
    slot.book();
    assert!(slot.release());
    assert!(slot.is_available());
}

#[test]
fn blocked_slots_cannot_be_booked() {
    let mut slot =
        TimeSlot::with_status(monday_at(10, 0), monday_at(10, 30), SlotStatus::Blocked).unwrap();

    assert!(!slot.book());
    assert!(!slot.release());
    assert_eq!(slot.status, SlotStatus::Blocked);
}

// ==============================================================================
// SCHEDULE AVAILABILITY
// ==============================================================================

#[test]
fn unconfigured_weekday_is_unavailable() {
    let mut schedule = Schedule::new(Uuid::new_v4());
    schedule.set_working_hours(Weekday::Tue, nine_to_five());

    assert!(!schedule.check_availability(monday_at(10, 0)));
}

#[test]
fn availability_follows_working_hours_half_open() {
    let mut schedule = Schedule::new(Uuid::new_v4());
    schedule.set_working_hours(Weekday::Mon, nine_to_five());

    assert!(!schedule.check_availability(monday_at(8, 59)));
    assert!(schedule.check_availability(monday_at(9, 0)));
    assert!(schedule.check_availability(monday_at(16, 59)));
    // End bound is exclusive.
    assert!(!schedule.check_availability(monday_at(17, 0)));
}

#[test]
fn blocked_intervals_mask_working_hours() {
    let mut schedule = Schedule::new(Uuid::new_v4());
    schedule.set_working_hours(Weekday::Mon, nine_to_five());

    let lunch = TimeSlot::new(monday_at(12, 0), monday_at(13, 0)).unwrap();
    schedule.add_blocked_time(lunch);

    assert!(schedule.check_availability(monday_at(11, 59)));
    // Half-open: start inclusive, end exclusive.
    assert!(!schedule.check_availability(monday_at(12, 0)));
    assert!(!schedule.check_availability(monday_at(12, 59)));
    assert!(schedule.check_availability(monday_at(13, 0)));
}

#[test]
fn blocking_and_unblocking_keep_collections_in_lockstep() {
    let mut schedule = Schedule::new(Uuid::new_v4());
    let slot = TimeSlot::new(monday_at(10, 0), monday_at(10, 30)).unwrap();
    let slot_id = slot.id;

    schedule.add_available_slot(slot.clone());
    assert_eq!(schedule.available_slots.len(), 1);

    schedule.add_blocked_time(slot);
    assert_eq!(schedule.available_slots.len(), 0);
    assert_eq!(schedule.blocked_slots.len(), 1);
    assert_eq!(schedule.blocked_slots[0].status, SlotStatus::Blocked);

    assert!(schedule.remove_blocked_time(slot_id));
    assert_eq!(schedule.blocked_slots.len(), 0);
    assert_eq!(schedule.available_slots.len(), 1);
    assert_eq!(schedule.available_slots[0].status, SlotStatus::Available);

    // Unknown id is reported, not silently ignored.
    assert!(!schedule.remove_blocked_time(Uuid::new_v4()));
}

#[test]
fn mutation_bumps_last_updated() {
    let mut schedule = Schedule::new(Uuid::new_v4());
    let before = schedule.last_updated;

    schedule.set_working_hours(Weekday::Mon, nine_to_five());
    assert!(schedule.last_updated >= before);
}

#[test]
fn available_slots_filter_by_calendar_date() {
    let mut schedule = Schedule::new(Uuid::new_v4());
    schedule.add_available_slot(TimeSlot::new(monday_at(10, 0), monday_at(10, 30)).unwrap());
    schedule.add_available_slot(
        TimeSlot::new(
            monday_at(10, 0) + Duration::days(1),
            monday_at(10, 30) + Duration::days(1),
        )
        .unwrap(),
    );

    let monday = monday_at(0, 0).date_naive();
    assert_eq!(schedule.available_slots_on(monday).len(), 1);
}

// ==============================================================================
// SCHEDULE SERVICE
// ==============================================================================

#[tokio::test]
async fn service_round_trips_schedule_mutations() {
    let service = ScheduleService::new();
    let doctor_id = Uuid::new_v4();

    service.create_schedule(doctor_id).await;
    service
        .set_working_hours(doctor_id, Weekday::Mon, nine_to_five())
        .await
        .unwrap();

    assert!(service
        .check_availability(doctor_id, monday_at(10, 0))
        .await
        .unwrap());

    let block = TimeSlot::new(monday_at(10, 0), monday_at(11, 0)).unwrap();
    let block_id = block.id;
    service.add_blocked_time(doctor_id, block).await.unwrap();
    assert!(!service
        .check_availability(doctor_id, monday_at(10, 30))
        .await
        .unwrap());

    service
        .remove_blocked_time(doctor_id, block_id)
        .await
        .unwrap();
    assert!(service
        .check_availability(doctor_id, monday_at(10, 30))
        .await
        .unwrap());
}

#[tokio::test]
async fn service_rejects_unknown_doctor() {
    let service = ScheduleService::new();

    assert!(service
        .check_availability(Uuid::new_v4(), monday_at(10, 0))
        .await
        .is_err());
    assert!(service
        .remove_blocked_time(Uuid::new_v4(), Uuid::new_v4())
        .await
        .is_err());
}
