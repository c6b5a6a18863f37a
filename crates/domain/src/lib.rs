//! # autotheme-domain
//!
//! Pure domain model for automatic light/dark theme switching.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, time-of-day parsing
//! - Define the **switch configuration** (mode, fixed times, offsets, location)
//! - Define the **service protocol vocabulary** (commands and status replies)
//! - Define **location data** as published by the background service
//! - Define **offsets** and the derived **effective sun times**
//! - Define the **scheduler state** and the events observers subscribe to
//! - Contain all invariant enforcement and input validation
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod command;
pub mod location;
pub mod offset;
pub mod settings;
pub mod state;
pub mod sun_times;
