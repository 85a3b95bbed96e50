//! Normalized event type.
//!
//! [`NormalizedEvent`] is the strongly-typed shape every raw API record is
//! converted into. All optionality is resolved when it is built, so the
//! serializer never has to deal with missing fields.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Title used when the source record has none.
pub const PLACEHOLDER_TITLE: &str = "Untitled Event";

/// Length assumed for events without an end time.
pub fn default_event_length() -> Duration {
    Duration::hours(1)
}

/// A calendar event ready for serialization.
///
/// Invariants upheld by the constructors:
/// - `title` is never empty
/// - `end >= start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    /// Stable identifier, used as the iCalendar UID.
    pub id: String,
    /// Event title.
    pub title: String,
    /// Start time in America/New_York.
    pub start: DateTime<Tz>,
    /// End time in America/New_York.
    pub end: DateTime<Tz>,
    /// Venue or address, empty when unknown.
    pub location: String,
    /// Free-form description, empty when unknown.
    pub description: String,
    /// Category codes, sorted and deduplicated.
    pub categories: Vec<String>,
}

impl NormalizedEvent {
    /// Creates an event lasting [`default_event_length`].
    ///
    /// A blank title is replaced with [`PLACEHOLDER_TITLE`].
    pub fn new(id: impl Into<String>, title: impl Into<String>, start: DateTime<Tz>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            PLACEHOLDER_TITLE.to_string()
        } else {
            title
        };

        Self {
            id: id.into(),
            title,
            start,
            end: start + default_event_length(),
            location: String::new(),
            description: String::new(),
            categories: Vec::new(),
        }
    }

    /// Sets the end time, clamped so it never precedes the start.
    pub fn with_end(mut self, end: DateTime<Tz>) -> Self {
        self.end = end.max(self.start);
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        categories.sort();
        categories.dedup();
        self.categories = categories;
        self
    }

    /// Returns how long the event lasts.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
