pub mod models;
pub mod services;

pub use models::{Schedule, SlotStatus, TimeSlot, WorkingHours};
pub use services::schedule::ScheduleService;
