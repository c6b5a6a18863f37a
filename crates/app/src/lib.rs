//! # autotheme-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `CommandChannel`: request/reply to the background theme service
//!   - `ConfigStore`: load & save the switch configuration
//!   - `LocationCache`: read the service-owned location cache
//!   - `GeolocationPermission` / `PlaceResolver`: OS location collaborators
//!   - `AstronomicalClock`: sunrise/sunset for a date and position
//!   - `PowerStatus`: energy-saver state
//!   - `EventPublisher`: notify observers of scheduler changes
//! - Define **driving/inbound ports** as use-case structs:
//!   - `LocationPoller`: resolve the device position, bounded in time
//!   - `SunTimeCalculator`: effective sunrise/sunset for today
//!   - `AutostartController`: register/unregister the service autostart
//!   - `ThemeSwitchScheduler`: mode state machine and the apply path
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `autotheme-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod scheduler;
pub mod services;
