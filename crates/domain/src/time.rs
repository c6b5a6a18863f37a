//! Time and timestamp helpers.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

use crate::error::ValidationError;

/// UTC timestamp used for sun times and location updates.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the current local calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a time-picker entry in `HH:MM` (24 hour) form.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimeOfDay`] for anything else.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidTimeOfDay(input.to_string()))
}

/// Anchor a local time of day on `date` and convert it to UTC.
///
/// Times that fall into a DST gap are taken as UTC.
#[must_use]
pub fn local_on(date: NaiveDate, time: NaiveTime) -> Timestamp {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(Local)
        .earliest()
        .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc))
}
