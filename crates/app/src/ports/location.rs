//! Location ports: the service-owned cache and the OS collaborators.

use std::future::Future;

use autotheme_domain::error::AutoThemeError;
use autotheme_domain::location::{Coordinates, GeolocationAccess, LocationData};

/// Read access to the location cache the background service writes.
///
/// Every read is a fresh snapshot; the writer is another process, so callers
/// must check [`LocationData::is_populated`] before trusting it.
pub trait LocationCache {
    fn read(&self) -> impl Future<Output = Result<LocationData, AutoThemeError>> + Send;
}

/// The OS geolocation permission API.
pub trait GeolocationPermission {
    fn request_access(&self) -> impl Future<Output = GeolocationAccess> + Send;
}

/// Reverse geocoding to a city name. Best effort.
pub trait PlaceResolver {
    fn resolve(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<String, AutoThemeError>> + Send;
}

impl<T: LocationCache + Send + Sync> LocationCache for std::sync::Arc<T> {
    fn read(&self) -> impl Future<Output = Result<LocationData, AutoThemeError>> + Send {
        (**self).read()
    }
}
