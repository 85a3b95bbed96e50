//! iCalendar parsing.
//!
//! Reads documents produced by [`write_calendar`](super::write_calendar)
//! (or any conforming producer) back into [`NormalizedEvent`]s. Structure
//! parsing, unfolding and TEXT unescaping use the `icalendar` crate's
//! parser. CATEGORIES lists are split from the raw line, since the parser
//! unescapes commas before they can be told apart from separators.

use chrono::{DateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use icalendar::parser::{Component, Property, read_calendar as parse_components, unfold};
use icalendar::{CalendarDateTime, DatePerhapsTime};
use thiserror::Error;
use tracing::debug;

use crate::event::NormalizedEvent;
use crate::time::{NEW_YORK, localize};

/// Errors that can occur while reading a calendar document.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The content is not a well-formed calendar.
    #[error("failed to parse calendar: {0}")]
    Parse(String),

    /// A VEVENT lacks a required property.
    #[error("event is missing required property {property}")]
    MissingProperty { property: &'static str },

    /// A date-time property could not be interpreted.
    #[error("invalid {property} value: {value}")]
    InvalidTime {
        property: &'static str,
        value: String,
    },
}

/// A calendar read back from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCalendar {
    /// The `X-WR-CALNAME` value, if present.
    pub name: Option<String>,
    /// Events in document order.
    pub events: Vec<NormalizedEvent>,
}

/// Parses iCalendar text into events.
pub fn read_calendar(content: &str) -> Result<ParsedCalendar, ReadError> {
    let unfolded = unfold(content);
    let calendar = parse_components(&unfolded).map_err(|e| ReadError::Parse(e.to_string()))?;

    let name = calendar
        .properties
        .iter()
        .find(|p| p.name == "X-WR-CALNAME")
        .map(text_value);

    let categories = raw_categories(&unfolded);
    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .enumerate()
        .map(|(i, vevent)| read_event(vevent, categories.get(i).and_then(Option::as_deref)))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(events = events.len(), "parsed calendar");
    Ok(ParsedCalendar { name, events })
}

fn read_event(
    vevent: &Component<'_>,
    raw_categories: Option<&str>,
) -> Result<NormalizedEvent, ReadError> {
    let uid = vevent
        .find_prop("UID")
        .map(text_value)
        .ok_or(ReadError::MissingProperty { property: "UID" })?;
    let start = vevent
        .find_prop("DTSTART")
        .ok_or(ReadError::MissingProperty { property: "DTSTART" })
        .and_then(|p| time_value(p, "DTSTART"))?;
    let title = vevent.find_prop("SUMMARY").map(text_value).unwrap_or_default();

    let mut event = NormalizedEvent::new(uid, title, start);

    if let Some(prop) = vevent.find_prop("DTEND") {
        event = event.with_end(time_value(prop, "DTEND")?);
    }
    if let Some(location) = vevent.find_prop("LOCATION") {
        event = event.with_location(text_value(location));
    }
    if let Some(description) = vevent.find_prop("DESCRIPTION") {
        event = event.with_description(text_value(description));
    }
    if let Some(raw) = raw_categories {
        event = event.with_categories(
            split_unescaped(raw, ',')
                .into_iter()
                .map(|c| unescape_text(&c))
                .filter(|c| !c.is_empty()),
        );
    }

    Ok(event)
}

fn text_value(prop: &Property<'_>) -> String {
    prop.val.to_string()
}

/// The escaped CATEGORIES value of each top-level VEVENT, in document order.
fn raw_categories(unfolded: &str) -> Vec<Option<String>> {
    let mut found: Vec<Option<String>> = Vec::new();
    let mut depth = 0usize;
    for line in unfolded.lines() {
        if line.eq_ignore_ascii_case("BEGIN:VEVENT") && depth == 0 {
            found.push(None);
            depth = 1;
            continue;
        }
        if depth == 0 {
            continue;
        }
        let Some((name, value)) = split_content_line(line) else {
            continue;
        };
        if name.eq_ignore_ascii_case("BEGIN") {
            depth += 1;
        } else if name.eq_ignore_ascii_case("END") {
            depth -= 1;
        } else if depth == 1 && name.eq_ignore_ascii_case("CATEGORIES") {
            if let Some(slot) = found.last_mut().filter(|slot| slot.is_none()) {
                *slot = Some(value.to_string());
            }
        }
    }
    found
}

/// Splits a content line into its property name and raw value.
///
/// Colons inside quoted parameter values do not end the parameters.
fn split_content_line(line: &str) -> Option<(&str, &str)> {
    let mut quoted = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            ':' if !quoted => {
                let head = &line[..i];
                let name = head.split(';').next().unwrap_or(head);
                return Some((name, &line[i + 1..]));
            }
            _ => {}
        }
    }
    None
}

fn time_value(prop: &Property<'_>, property: &'static str) -> Result<DateTime<Tz>, ReadError> {
    let invalid = || ReadError::InvalidTime {
        property,
        value: prop.val.to_string(),
    };
    let value = DatePerhapsTime::try_from(prop).map_err(|_| invalid())?;
    to_new_york(value).ok_or_else(invalid)
}

/// Converts any iCalendar date or date-time into New York time.
fn to_new_york(value: DatePerhapsTime) -> Option<DateTime<Tz>> {
    match value {
        DatePerhapsTime::Date(date) => localize(date.and_time(NaiveTime::MIN)),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(dt.with_timezone(&NEW_YORK)),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => localize(naive),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let tz: Tz = tzid.parse().ok()?;
            tz.from_local_datetime(&date_time)
                .earliest()
                .map(|dt| dt.with_timezone(&NEW_YORK))
        }
    }
}

/// Reverses [`escape_text`](super::escape_text).
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Splits on `separator` occurrences that are not backslash-escaped.
fn split_unescaped(value: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in value.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            current.push(ch);
            escaped = true;
        } else if ch == separator {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    parts.push(current);
    parts
}
