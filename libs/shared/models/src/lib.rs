pub mod doctor;
pub mod patient;

pub use doctor::Doctor;
pub use patient::Patient;

use uuid::Uuid;

/// Capability required of every entity held in a keyed store: it can name
/// its own identifier. Stores key records by this value instead of probing
/// for an id attribute at runtime.
pub trait HasId {
    fn id(&self) -> Uuid;
}
