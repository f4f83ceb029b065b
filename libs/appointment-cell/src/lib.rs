pub mod models;
pub mod services;
pub mod store;

pub use models::{Appointment, AppointmentError, AppointmentStatus, AppointmentType};
pub use services::AppointmentBookingService;
pub use store::{AppointmentRepository, InMemoryAppointmentRepository};
