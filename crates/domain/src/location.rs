//! Location: coordinates and the location cache written by the background
//! service.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::Timestamp;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates after range-checking both axes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LatitudeOutOfRange`] or
    /// [`ValidationError::LongitudeOutOfRange`] (also for NaN).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lat {:.3} / Lon {:.3}", self.latitude, self.longitude)
    }
}

/// Snapshot of the service-owned location cache.
///
/// The core only reads this. A missing `last_update` means the service has
/// never stored a fix and the coordinates are meaningless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    pub last_update: Option<Timestamp>,
}

impl LocationData {
    /// Whether the service has written a fix at least once.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.last_update.is_some()
    }

    /// Coordinates of the fix, if there is one.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.last_update.map(|_| Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// Answer of the OS geolocation permission API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationAccess {
    Allowed,
    /// Denied, but the OS still exposes a cached default position.
    DeniedWithDefault,
    DeniedOrUnspecified,
}

impl GeolocationAccess {
    /// Whether location-based scheduling can proceed.
    #[must_use]
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Allowed | Self::DeniedWithDefault)
    }
}

/// A device position the scheduler may act on.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    /// Human-readable place name; `None` when reverse geocoding failed.
    pub place_name: Option<String>,
    pub last_update: Timestamp,
}
