//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod autostart_controller;
pub mod location_poller;
pub mod sun_time_calculator;
