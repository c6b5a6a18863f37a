use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta};

use autotheme_app::ports::AstronomicalClock;
use autotheme_domain::location::Coordinates;
use autotheme_domain::sun_times::SunEvents;
use autotheme_domain::time::Timestamp;

/// Solar zenith at apparent sunrise/sunset, including refraction.
const ZENITH_DEG: f64 = 90.833;

/// Sunrise/sunset from the NOAA fractional-year formulas.
///
/// Polar day and polar night are clamped instead of failing: during polar
/// night sunrise and sunset both fall on solar noon, during polar day they
/// are twelve hours either side of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoaaSolarClock;

impl NoaaSolarClock {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AstronomicalClock for NoaaSolarClock {
    fn sun_events(&self, coordinates: Coordinates, date: NaiveDate) -> SunEvents {
        let days_in_year = NaiveDate::from_ymd_opt(date.year(), 12, 31).map_or(365, |d| d.ordinal());
        let gamma = 2.0 * PI / f64::from(days_in_year) * f64::from(date.ordinal() - 1);

        let eqtime = 229.18
            * (0.000_075 + 0.001_868 * gamma.cos()
                - 0.032_077 * gamma.sin()
                - 0.014_615 * (2.0 * gamma).cos()
                - 0.040_849 * (2.0 * gamma).sin());
        let decl = 0.006_918 - 0.399_912 * gamma.cos() + 0.070_257 * gamma.sin()
            - 0.006_758 * (2.0 * gamma).cos()
            + 0.000_907 * (2.0 * gamma).sin()
            - 0.002_697 * (3.0 * gamma).cos()
            + 0.001_48 * (3.0 * gamma).sin();

        let lat = coordinates.latitude.to_radians();
        let cos_ha = (ZENITH_DEG.to_radians().cos() / (lat.cos() * decl.cos())
            - lat.tan() * decl.tan())
        .clamp(-1.0, 1.0);
        let ha = cos_ha.acos().to_degrees();

        let lon = coordinates.longitude;
        SunEvents {
            sunrise: at_minutes(date, 720.0 - 4.0 * (lon + ha) - eqtime),
            sunset: at_minutes(date, 720.0 - 4.0 * (lon - ha) - eqtime),
        }
    }
}

/// `minutes` after UTC midnight of `date`. May spill into the adjacent day.
///
/// Offsets chrono cannot represent collapse to midnight.
#[allow(clippy::cast_possible_truncation)]
fn at_minutes(date: NaiveDate, minutes: f64) -> Timestamp {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    let offset = TimeDelta::try_seconds((minutes * 60.0).round() as i64).unwrap_or_default();
    midnight.checked_add_signed(offset).unwrap_or(midnight)
}
