//! Astronomy port: sunrise and sunset for a position and date.

use chrono::NaiveDate;

use autotheme_domain::location::Coordinates;
use autotheme_domain::sun_times::SunEvents;

/// Computes astronomical sun events. Implementations must be pure and
/// always return an answer (polar day/night included).
pub trait AstronomicalClock {
    fn sun_events(&self, coordinates: Coordinates, date: NaiveDate) -> SunEvents;
}
