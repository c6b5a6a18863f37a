//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod astronomy;
pub mod command_channel;
pub mod event_bus;
pub mod location;
pub mod power;
pub mod storage;

pub use astronomy::AstronomicalClock;
pub use command_channel::CommandChannel;
pub use event_bus::EventPublisher;
pub use location::{GeolocationPermission, LocationCache, PlaceResolver};
pub use power::PowerStatus;
pub use storage::ConfigStore;
