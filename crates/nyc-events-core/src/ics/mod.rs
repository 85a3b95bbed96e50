//! iCalendar (RFC 5545) serialization.
//!
//! - [`write_calendar`] turns a [`CalendarDocument`](crate::CalendarDocument) into text
//! - [`read_calendar`] parses text back into events

mod read;
mod write;

#[cfg(test)]
mod golden_tests;

pub use read::{ParsedCalendar, ReadError, read_calendar, unescape_text};
pub use write::{PRODID, escape_text, fold_line, write_calendar};
