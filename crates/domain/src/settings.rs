//! Switch configuration: what the user chose on the settings page.
//!
//! [`SwitchConfig`] is loaded once per session, edited in place and persisted
//! through the `ConfigStore` port. Field names are the persistence contract.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{AutoThemeError, ValidationError};
use crate::location::Coordinates;
use crate::offset::Offsets;

/// Where the switch times come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchMode {
    #[default]
    Disabled,
    /// User-picked sunrise and sunset clock times.
    FixedTimes,
    /// Sun times computed from user-entered coordinates.
    Coordinates,
    /// Sun times computed from the OS location service.
    DeviceLocation,
}

impl SwitchMode {
    /// Whether this mode derives its times from a position.
    #[must_use]
    pub fn uses_location(self) -> bool {
        matches!(self, Self::Coordinates | Self::DeviceLocation)
    }
}

impl fmt::Display for SwitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::FixedTimes => f.write_str("fixed_times"),
            Self::Coordinates => f.write_str("coordinates"),
            Self::DeviceLocation => f.write_str("device_location"),
        }
    }
}

/// Location block of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    pub latitude: f64,
    pub longitude: f64,
    pub enabled: bool,
    pub use_device_service: bool,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            enabled: false,
            use_device_service: false,
        }
    }
}

/// Persisted automatic-switching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    pub auto_switching_enabled: bool,
    pub mode: SwitchMode,
    /// Fixed light-theme start, used verbatim in [`SwitchMode::FixedTimes`].
    pub sunrise: NaiveTime,
    /// Fixed dark-theme start, used verbatim in [`SwitchMode::FixedTimes`].
    pub sunset: NaiveTime,
    pub sunrise_offset_min: i32,
    pub sunset_offset_min: i32,
    pub location: LocationSettings,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            auto_switching_enabled: false,
            mode: SwitchMode::Disabled,
            sunrise: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            sunset: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or(NaiveTime::MIN),
            sunrise_offset_min: 0,
            sunset_offset_min: 0,
            location: LocationSettings::default(),
        }
    }
}

impl SwitchConfig {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AutoThemeError::Validation`] when:
    /// - a non-disabled mode has switching turned off ([`ValidationError::SwitchingNotEnabled`])
    /// - a location mode has location turned off ([`ValidationError::LocationNotEnabled`])
    /// - the stored coordinates are out of range or NaN
    pub fn validate(&self) -> Result<(), AutoThemeError> {
        Coordinates::new(self.location.latitude, self.location.longitude)?;
        if self.mode != SwitchMode::Disabled && !self.auto_switching_enabled {
            return Err(ValidationError::SwitchingNotEnabled(self.mode).into());
        }
        if self.mode.uses_location() && !self.location.enabled {
            return Err(ValidationError::LocationNotEnabled(self.mode).into());
        }
        Ok(())
    }

    /// Bring a loaded configuration back within its invariants.
    ///
    /// Unusable coordinates are reset to the default position and the
    /// dependent flags are re-derived from the stored mode.
    pub fn repair(&mut self) {
        if Coordinates::new(self.location.latitude, self.location.longitude).is_err() {
            let defaults = LocationSettings::default();
            self.location.latitude = defaults.latitude;
            self.location.longitude = defaults.longitude;
        }
        self.enter_mode(self.mode);
    }

    /// Switch to `mode`, adjusting the dependent flags so invariants hold.
    ///
    /// Leaving for [`SwitchMode::Disabled`] only clears the master switch;
    /// the location block is kept so re-enabling restores it.
    pub fn enter_mode(&mut self, mode: SwitchMode) {
        self.mode = mode;
        match mode {
            SwitchMode::Disabled => self.auto_switching_enabled = false,
            SwitchMode::FixedTimes => {
                self.auto_switching_enabled = true;
                self.location.enabled = false;
            }
            SwitchMode::Coordinates => {
                self.auto_switching_enabled = true;
                self.location.enabled = true;
                self.location.use_device_service = false;
            }
            SwitchMode::DeviceLocation => {
                self.auto_switching_enabled = true;
                self.location.enabled = true;
                self.location.use_device_service = true;
            }
        }
    }

    /// Stored signed offsets.
    #[must_use]
    pub fn offsets(&self) -> Offsets {
        Offsets {
            sunrise_min: self.sunrise_offset_min,
            sunset_min: self.sunset_offset_min,
        }
    }

    /// Replace both offsets.
    pub fn set_offsets(&mut self, offsets: Offsets) {
        self.sunrise_offset_min = offsets.sunrise_min;
        self.sunset_offset_min = offsets.sunset_min;
    }

    /// Stored manual coordinates.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.location.latitude,
            longitude: self.location.longitude,
        }
    }

    /// Replace the stored manual coordinates.
    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.location.latitude = coordinates.latitude;
        self.location.longitude = coordinates.longitude;
    }
}
