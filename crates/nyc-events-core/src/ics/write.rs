//! iCalendar generation.
//!
//! Output depends only on the document: UIDs come from event ids, DTSTAMP
//! is derived from the event start, and properties are written in a fixed
//! order.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::calendar::CalendarDocument;
use crate::event::NormalizedEvent;
use crate::time::NEW_YORK;

/// PRODID of every generated calendar.
pub const PRODID: &str = "-//nyc-events//NYC Events Calendar//EN";

/// Maximum content line length in octets, excluding the CRLF.
const LINE_LIMIT: usize = 75;

const CRLF: &str = "\r\n";

/// Static VTIMEZONE for America/New_York (US rules since 2007).
const NEW_YORK_VTIMEZONE: &[&str] = &[
    "BEGIN:VTIMEZONE",
    "TZID:America/New_York",
    "X-LIC-LOCATION:America/New_York",
    "BEGIN:DAYLIGHT",
    "TZOFFSETFROM:-0500",
    "TZOFFSETTO:-0400",
    "TZNAME:EDT",
    "DTSTART:19700308T020000",
    "RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU",
    "END:DAYLIGHT",
    "BEGIN:STANDARD",
    "TZOFFSETFROM:-0400",
    "TZOFFSETTO:-0500",
    "TZNAME:EST",
    "DTSTART:19701101T020000",
    "RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU",
    "END:STANDARD",
    "END:VTIMEZONE",
];

/// Serializes a calendar document.
///
/// Lines end with CRLF and are folded at 75 octets.
pub fn write_calendar(doc: &CalendarDocument) -> String {
    let mut out = ContentWriter::default();

    out.line("BEGIN:VCALENDAR");
    out.line("VERSION:2.0");
    out.property("PRODID", PRODID);
    out.line("CALSCALE:GREGORIAN");
    out.line("METHOD:PUBLISH");
    out.text("X-WR-CALNAME", doc.name());
    out.property("X-WR-TIMEZONE", NEW_YORK.name());
    for line in NEW_YORK_VTIMEZONE {
        out.line(line);
    }

    for event in doc.events() {
        write_event(&mut out, event);
    }

    out.line("END:VCALENDAR");
    out.finish()
}

fn write_event(out: &mut ContentWriter, event: &NormalizedEvent) {
    out.line("BEGIN:VEVENT");
    out.text("UID", &event.id);
    out.property("DTSTAMP", &format_utc(&event.start));
    out.local_time("DTSTART", &event.start);
    out.local_time("DTEND", &event.end);
    out.text("SUMMARY", &event.title);
    out.text("LOCATION", &event.location);
    out.text("DESCRIPTION", &event.description);
    if !event.categories.is_empty() {
        let joined = event
            .categories
            .iter()
            .map(|c| escape_text(c))
            .collect::<Vec<_>>()
            .join(",");
        out.property("CATEGORIES", &joined);
    }
    out.line("END:VEVENT");
}

/// Accumulates folded content lines.
#[derive(Default)]
struct ContentWriter {
    buf: String,
}

impl ContentWriter {
    fn line(&mut self, content: &str) {
        self.buf.push_str(&fold_line(content));
        self.buf.push_str(CRLF);
    }

    fn property(&mut self, name: &str, value: &str) {
        self.line(&format!("{name}:{value}"));
    }

    fn text(&mut self, name: &str, value: &str) {
        self.property(name, &escape_text(value));
    }

    /// Writes New York wall-clock time, or UTC for the second pass through
    /// the repeated November hour, which a TZID value cannot name.
    fn local_time(&mut self, name: &str, dt: &DateTime<Tz>) {
        let local = dt.with_timezone(&NEW_YORK);
        if NEW_YORK.from_local_datetime(&local.naive_local()).earliest() != Some(local) {
            self.property(name, &format_utc(dt));
            return;
        }
        self.line(&format!(
            "{name};TZID={}:{}",
            NEW_YORK.name(),
            local.format("%Y%m%dT%H%M%S")
        ));
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn format_utc(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escapes a TEXT value (RFC 5545 §3.3.11).
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Folds a content line so no physical line exceeds 75 octets.
///
/// Continuation lines start with a single space. Multi-byte characters are
/// never split.
pub fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + line.len() / LINE_LIMIT * 3);
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > LINE_LIMIT {
            folded.push_str(CRLF);
            folded.push(' ');
            width = 1;
        }
        folded.push(ch);
        width += len;
    }
    folded
}
