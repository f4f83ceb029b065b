use std::env;
use tracing::warn;

/// Booking rule constants, passed into the booking engine at construction.
/// Deployments tune these through environment variables; everything else
/// falls back to the clinic defaults.
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    /// Minimum interval between "now" and a booking's start instant, in hours.
    pub min_lead_time_hours: i64,
    /// Minimum interval between "now" and the start of an appointment being
    /// cancelled, in hours.
    pub cancellation_window_hours: i64,
    /// Maximum count of non-cancelled appointments a patient may hold on a
    /// single calendar date.
    pub max_appointments_per_day: usize,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            min_lead_time_hours: 24,
            cancellation_window_hours: 6,
            max_appointments_per_day: 3,
        }
    }
}

impl BookingPolicy {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            min_lead_time_hours: read_env("BOOKING_MIN_LEAD_TIME_HOURS", defaults.min_lead_time_hours),
            cancellation_window_hours: read_env(
                "BOOKING_CANCELLATION_WINDOW_HOURS",
                defaults.cancellation_window_hours,
            ),
            max_appointments_per_day: read_env(
                "BOOKING_MAX_APPOINTMENTS_PER_DAY",
                defaults.max_appointments_per_day,
            ),
        }
    }
}

fn read_env<T: std::str::FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
