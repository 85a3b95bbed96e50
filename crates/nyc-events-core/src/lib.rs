//! Core types: events, time handling, calendar documents and iCalendar I/O

pub mod calendar;
pub mod event;
pub mod ics;
pub mod text;
pub mod time;
pub mod tracing;

pub use calendar::{CalendarDocument, DEFAULT_CALENDAR_NAME};
pub use event::{NormalizedEvent, PLACEHOLDER_TITLE, default_event_length};
pub use ics::{ParsedCalendar, ReadError, read_calendar, write_calendar};
pub use text::sanitize_text;
pub use time::{DateWindow, NEW_YORK, from_epoch, localize, parse_timestamp};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
