//! Sun time calculator: effective sunrise/sunset for a date.

use chrono::NaiveDate;

use autotheme_domain::location::Coordinates;
use autotheme_domain::settings::SwitchConfig;
use autotheme_domain::sun_times::EffectiveSunTimes;

use crate::ports::AstronomicalClock;

/// Turns configuration (and an optional position) into switch times.
pub struct SunTimeCalculator<A> {
    clock: A,
}

impl<A: AstronomicalClock> SunTimeCalculator<A> {
    pub fn new(clock: A) -> Self {
        Self { clock }
    }

    /// Compute the effective times for `date`.
    ///
    /// Without a position the fixed `sunrise`/`sunset` of `config` are used
    /// verbatim and offsets are ignored. With a position the astronomical
    /// events are shifted by the stored signed offsets.
    pub fn compute(
        &self,
        config: &SwitchConfig,
        location: Option<Coordinates>,
        date: NaiveDate,
    ) -> EffectiveSunTimes {
        match location {
            None => EffectiveSunTimes::fixed(date, config.sunrise, config.sunset),
            Some(coordinates) => self
                .clock
                .sun_events(coordinates, date)
                .with_offsets(config.offsets()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotheme_domain::sun_times::SunEvents;
    use autotheme_domain::time::local_on;
    use chrono::{NaiveTime, TimeDelta, TimeZone, Utc};

    struct FixedClock;

    impl AstronomicalClock for FixedClock {
        fn sun_events(&self, _coordinates: Coordinates, date: NaiveDate) -> SunEvents {
            let midnight = date.and_time(NaiveTime::MIN).and_utc();
            SunEvents {
                sunrise: midnight + TimeDelta::hours(5),
                sunset: midnight + TimeDelta::hours(20),
            }
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
    }

    fn berlin() -> Coordinates {
        Coordinates::new(52.52, 13.405).unwrap()
    }

    #[test]
    fn should_use_fixed_times_verbatim_without_location() {
        let calc = SunTimeCalculator::new(FixedClock);
        let config = SwitchConfig {
            sunrise_offset_min: 90,
            sunset_offset_min: -90,
            ..SwitchConfig::default()
        };

        let times = calc.compute(&config, None, date());

        assert_eq!(times.sunrise_at, local_on(date(), config.sunrise));
        assert_eq!(times.sunset_at, local_on(date(), config.sunset));
    }

    #[test]
    fn should_shift_astronomical_times_by_offsets() {
        let calc = SunTimeCalculator::new(FixedClock);
        let config = SwitchConfig {
            sunrise_offset_min: 30,
            sunset_offset_min: -15,
            ..SwitchConfig::default()
        };

        let times = calc.compute(&config, Some(berlin()), date());

        assert_eq!(
            times.sunrise_at,
            Utc.with_ymd_and_hms(2024, 6, 21, 5, 30, 0).unwrap()
        );
        assert_eq!(
            times.sunset_at,
            Utc.with_ymd_and_hms(2024, 6, 21, 19, 45, 0).unwrap()
        );
    }

    #[test]
    fn should_apply_offsets_linearly() {
        let calc = SunTimeCalculator::new(FixedClock);
        let base = calc.compute(&SwitchConfig::default(), Some(berlin()), date());

        for (o1, o2) in [(-1439, 1439), (1, 2), (-600, -600), (1000, -1)] {
            let config = SwitchConfig {
                sunrise_offset_min: o1,
                sunset_offset_min: o2,
                ..SwitchConfig::default()
            };
            let times = calc.compute(&config, Some(berlin()), date());
            assert_eq!(
                times.sunrise_at - base.sunrise_at,
                TimeDelta::minutes(i64::from(o1))
            );
            assert_eq!(
                times.sunset_at - base.sunset_at,
                TimeDelta::minutes(i64::from(o2))
            );
        }
    }
}
