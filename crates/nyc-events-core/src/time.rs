//! Time handling for NYC events.
//!
//! Every event time in this workspace lives in America/New_York. This module
//! provides:
//! - [`parse_timestamp`] and [`from_epoch`] for the timestamp shapes the
//!   events API is known to return
//! - [`DateWindow`], the inclusive `[now, now + days]` range used to filter
//!   events

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The zone all events are normalized to.
pub const NEW_YORK: Tz = chrono_tz::America::New_York;

/// Epoch values above this are treated as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Formats carrying an explicit UTC offset (RFC 3339 is tried first).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

/// Wall-clock formats, interpreted in New York.
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Date-only formats, mapped to local midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a timestamp string into a New York datetime.
///
/// Strings with an offset keep their instant and are converted; strings
/// without one are read as New York wall-clock time. Returns `None` for
/// unknown formats and for local times that do not exist (DST gap).
pub fn parse_timestamp(input: &str) -> Option<DateTime<Tz>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&NEW_YORK));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&NEW_YORK));
        }
    }

    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return localize(naive);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return localize(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Converts a Unix epoch value (seconds, or milliseconds when large) to New York time.
pub fn from_epoch(value: i64) -> Option<DateTime<Tz>> {
    let utc = if value.unsigned_abs() > EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
        DateTime::<Utc>::from_timestamp_millis(value)?
    } else {
        DateTime::<Utc>::from_timestamp(value, 0)?
    };
    Some(utc.with_timezone(&NEW_YORK))
}

/// Interprets a naive datetime as New York wall-clock time.
///
/// Ambiguous times (the repeated hour in November) resolve to the earlier
/// instant; times inside the spring-forward gap yield `None`.
pub fn localize(naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    NEW_YORK.from_local_datetime(&naive).earliest()
}

/// An inclusive window `[start, end]` of event start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// First accepted start time.
    pub start: DateTime<Tz>,
    /// Last accepted start time.
    pub end: DateTime<Tz>,
}

impl DateWindow {
    /// Creates the window `[now, now + days]`.
    ///
    /// The end saturates at the latest representable instant.
    pub fn days_ahead(now: DateTime<Utc>, days: u32) -> Self {
        let start = now.with_timezone(&NEW_YORK);
        let end = start
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or_else(|| DateTime::<Utc>::MAX_UTC.with_timezone(&NEW_YORK));
        Self { start, end }
    }

    /// Checks whether `dt` falls inside the window, both ends included.
    pub fn contains(&self, dt: &DateTime<Tz>) -> bool {
        self.start <= *dt && *dt <= self.end
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d %H:%M %Z"),
            self.end.format("%Y-%m-%d %H:%M %Z")
        )
    }
}
