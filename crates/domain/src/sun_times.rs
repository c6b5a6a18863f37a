//! Sun times: astronomical events and the effective switch times derived
//! from them.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::offset::Offsets;
use crate::time::{Timestamp, local_on};

/// Astronomical sunrise and sunset for one date and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunEvents {
    pub sunrise: Timestamp,
    pub sunset: Timestamp,
}

impl SunEvents {
    /// Shift each event by its signed minute offset.
    #[must_use]
    pub fn with_offsets(self, offsets: Offsets) -> EffectiveSunTimes {
        EffectiveSunTimes {
            sunrise_at: self.sunrise + TimeDelta::minutes(i64::from(offsets.sunrise_min)),
            sunset_at: self.sunset + TimeDelta::minutes(i64::from(offsets.sunset_min)),
        }
    }
}

/// When the light and dark themes start today. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveSunTimes {
    pub sunrise_at: Timestamp,
    pub sunset_at: Timestamp,
}

impl EffectiveSunTimes {
    /// Fixed local clock times on `date`, taken verbatim.
    #[must_use]
    pub fn fixed(date: NaiveDate, sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        Self {
            sunrise_at: local_on(date, sunrise),
            sunset_at: local_on(date, sunset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn events() -> SunEvents {
        SunEvents {
            sunrise: Utc.with_ymd_and_hms(2024, 6, 21, 3, 43, 0).unwrap(),
            sunset: Utc.with_ymd_and_hms(2024, 6, 21, 19, 33, 0).unwrap(),
        }
    }

    #[test]
    fn should_add_signed_offsets_per_channel() {
        let effective = events().with_offsets(Offsets {
            sunrise_min: 30,
            sunset_min: -45,
        });
        assert_eq!(
            effective.sunrise_at,
            Utc.with_ymd_and_hms(2024, 6, 21, 4, 13, 0).unwrap()
        );
        assert_eq!(
            effective.sunset_at,
            Utc.with_ymd_and_hms(2024, 6, 21, 18, 48, 0).unwrap()
        );
    }

    #[test]
    fn should_follow_linear_offset_law() {
        let base = events();
        for (o1, o2) in [(0, 0), (1, -1), (-1439, 1439), (720, -720), (-60, 15)] {
            let effective = base.with_offsets(Offsets {
                sunrise_min: o1,
                sunset_min: o2,
            });
            assert_eq!(
                effective.sunrise_at - base.sunrise,
                TimeDelta::minutes(i64::from(o1))
            );
            assert_eq!(
                effective.sunset_at - base.sunset,
                TimeDelta::minutes(i64::from(o2))
            );
        }
    }

    #[test]
    fn should_anchor_fixed_times_on_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let sunrise = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        let sunset = NaiveTime::from_hms_opt(19, 0, 0).unwrap();
        let fixed = EffectiveSunTimes::fixed(date, sunrise, sunset);
        assert_eq!(fixed.sunrise_at, local_on(date, sunrise));
        assert_eq!(fixed.sunset_at, local_on(date, sunset));
        assert!(fixed.sunrise_at < fixed.sunset_at);
    }
}
