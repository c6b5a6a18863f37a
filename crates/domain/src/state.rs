//! Scheduler state: which switching mode is active and, for device
//! location, how far resolution got.

use std::fmt;

use serde::Serialize;

use crate::settings::{SwitchConfig, SwitchMode};

/// Why device-location mode has no usable position yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingReason {
    /// A location lookup is running (or has not been started).
    Searching,
    /// The user has to grant location permission first.
    NoAccess,
    /// The service never published a fix within the poll budget.
    TimedOut,
    /// The lookup failed for another reason (e.g. the service was unreachable).
    Failed,
}

/// Observable state of the theme-switch scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SchedulerState {
    Disabled,
    FixedTimes,
    Coordinates,
    DeviceLocationPending(PendingReason),
    DeviceLocationResolved,
}

impl SchedulerState {
    /// State to start a session in, derived from the persisted configuration.
    ///
    /// Device-location mode always starts out searching: the position has to
    /// be resolved again before it can be used.
    #[must_use]
    pub fn restore(config: &SwitchConfig) -> Self {
        if !config.auto_switching_enabled {
            return Self::Disabled;
        }
        match config.mode {
            SwitchMode::Disabled => Self::Disabled,
            SwitchMode::FixedTimes => Self::FixedTimes,
            SwitchMode::Coordinates => Self::Coordinates,
            SwitchMode::DeviceLocation => Self::DeviceLocationPending(PendingReason::Searching),
        }
    }

    /// Configuration mode this state belongs to.
    #[must_use]
    pub fn mode(self) -> SwitchMode {
        match self {
            Self::Disabled => SwitchMode::Disabled,
            Self::FixedTimes => SwitchMode::FixedTimes,
            Self::Coordinates => SwitchMode::Coordinates,
            Self::DeviceLocationPending(_) | Self::DeviceLocationResolved => {
                SwitchMode::DeviceLocation
            }
        }
    }
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::FixedTimes => f.write_str("fixed times"),
            Self::Coordinates => f.write_str("coordinates"),
            Self::DeviceLocationPending(PendingReason::Searching) => {
                f.write_str("device location (searching)")
            }
            Self::DeviceLocationPending(PendingReason::NoAccess) => {
                f.write_str("device location (no access)")
            }
            Self::DeviceLocationPending(PendingReason::TimedOut) => {
                f.write_str("device location (timed out)")
            }
            Self::DeviceLocationPending(PendingReason::Failed) => {
                f.write_str("device location (failed)")
            }
            Self::DeviceLocationResolved => f.write_str("device location"),
        }
    }
}

/// Notification published to observers (settings widgets, tray, CLI).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    StateChanged { state: SchedulerState },
    SunTimesUpdated { sun_times: crate::sun_times::EffectiveSunTimes },
    /// A `Switch` was acknowledged by the service.
    Committed { warning: Option<ApplyWarning> },
    /// Apply reached the service but did not succeed.
    ApplyFailed { reason: String },
}

/// Non-fatal condition reported alongside a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyWarning {
    /// Running on battery with the energy saver on; the service may defer
    /// switching until it is turned off.
    PowerSaverActive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_restore_disabled_when_master_switch_off() {
        let config = SwitchConfig::default();
        assert_eq!(SchedulerState::restore(&config), SchedulerState::Disabled);
    }

    #[test]
    fn should_restore_each_enabled_mode() {
        let mut config = SwitchConfig::default();
        config.enter_mode(SwitchMode::FixedTimes);
        assert_eq!(SchedulerState::restore(&config), SchedulerState::FixedTimes);
        config.enter_mode(SwitchMode::Coordinates);
        assert_eq!(SchedulerState::restore(&config), SchedulerState::Coordinates);
        config.enter_mode(SwitchMode::DeviceLocation);
        assert_eq!(
            SchedulerState::restore(&config),
            SchedulerState::DeviceLocationPending(PendingReason::Searching)
        );
    }

    #[test]
    fn should_map_device_states_to_device_mode() {
        assert_eq!(
            SchedulerState::DeviceLocationPending(PendingReason::NoAccess).mode(),
            SwitchMode::DeviceLocation
        );
        assert_eq!(
            SchedulerState::DeviceLocationResolved.mode(),
            SwitchMode::DeviceLocation
        );
    }

    #[test]
    fn should_serialize_event_with_type_tag() {
        let event = SchedulerEvent::StateChanged {
            state: SchedulerState::DeviceLocationPending(PendingReason::NoAccess),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "state_changed");
        assert_eq!(json["state"]["state"], "device_location_pending");
        assert_eq!(json["state"]["reason"], "no_access");
    }
}
