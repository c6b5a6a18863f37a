//! # autotheme-adapter-virtual
//!
//! Stand-ins for the platform services the scheduler consults but does not
//! own. They make the CLI usable on machines without a geolocation or
//! energy-saver API and keep tests deterministic.
//!
//! | Port | Implementation | Behaviour |
//! |------|----------------|-----------|
//! | `GeolocationPermission` | [`ScriptedPermission`] | Always answers the configured access level |
//! | `PlaceResolver` | [`CoordinatePlaceResolver`] | Names a place by its coordinates |
//! | `PowerStatus` | [`FixedPowerStatus`] | Reports a configured energy-saver flag |
//!
//! ## Dependency rule
//!
//! Depends on `autotheme-app` (port traits) and `autotheme-domain` only.

mod permission;
mod place;
mod power;

pub use permission::ScriptedPermission;
pub use place::CoordinatePlaceResolver;
pub use power::FixedPowerStatus;
