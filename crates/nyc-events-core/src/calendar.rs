//! The calendar document written by each run.

use crate::event::NormalizedEvent;
use crate::ics;

/// Default value of the `X-WR-CALNAME` property.
pub const DEFAULT_CALENDAR_NAME: &str = "NYC Events";

/// An immutable, ordered collection of events.
///
/// Events are sorted by start time, then by id, so the same set of events
/// always serializes to the same bytes regardless of upstream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    name: String,
    events: Vec<NormalizedEvent>,
}

impl CalendarDocument {
    /// Builds a document from events in any order.
    pub fn new(name: impl Into<String>, mut events: Vec<NormalizedEvent>) -> Self {
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Self {
            name: name.into(),
            events,
        }
    }

    /// Calendar display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Events in document order.
    pub fn events(&self) -> &[NormalizedEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the document holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Serializes the document as iCalendar text.
    pub fn to_ics(&self) -> String {
        ics::write_calendar(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::NEW_YORK;
    use chrono::TimeZone;

    fn event(id: &str, hour: u32) -> NormalizedEvent {
        NormalizedEvent::new(
            id,
            format!("Event {id}"),
            NEW_YORK.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn sorts_by_start_then_id() {
        let doc = CalendarDocument::new(
            DEFAULT_CALENDAR_NAME,
            vec![event("b", 18), event("c", 9), event("a", 18)],
        );
        let ids: Vec<&str> = doc.events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let forward = CalendarDocument::new("x", vec![event("a", 10), event("b", 11)]);
        let backward = CalendarDocument::new("x", vec![event("b", 11), event("a", 10)]);
        assert_eq!(forward, backward);
        assert_eq!(forward.to_ics(), backward.to_ics());
    }

    #[test]
    fn empty_document() {
        let doc = CalendarDocument::new(DEFAULT_CALENDAR_NAME, Vec::new());
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
        assert_eq!(doc.name(), "NYC Events");
    }
}
