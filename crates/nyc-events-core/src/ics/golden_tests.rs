//! Golden tests for calendar output.
//!
//! The serialized calendar is the file downstream automation diffs, so its
//! exact bytes are pinned here. Run `cargo insta review` after intentional
//! format changes.

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use crate::calendar::{CalendarDocument, DEFAULT_CALENDAR_NAME};
use crate::event::NormalizedEvent;
use crate::time::NEW_YORK;

fn ny(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
    NEW_YORK.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn sample_document() -> CalendarDocument {
    let summer_streets = NormalizedEvent::new("nyc-1001", "Summer Streets", ny(2025, 8, 2, 7, 0))
        .with_end(ny(2025, 8, 2, 13, 0))
        .with_location("Park Avenue, from Brooklyn Bridge to 72nd Street")
        .with_description(
            "Nearly seven miles of car-free streets; walking, running, biking and playing \
             along Park Avenue. Rest stops offer free activities, water and restrooms.",
        )
        .with_categories(["SPORTS", "OUTDOOR"]);

    let poetry = NormalizedEvent::new("nyc-0999", "Poetry Night", ny(2025, 8, 1, 19, 30))
        .with_description("Open mic\nSign-up at 7pm");

    CalendarDocument::new(DEFAULT_CALENDAR_NAME, vec![summer_streets, poetry])
}

#[test]
fn golden_calendar_two_events() {
    let output = sample_document().to_ics().replace("\r\n", "\n");
    insta::assert_snapshot!("calendar_two_events", output);
}

#[test]
fn golden_output_is_byte_stable() {
    let first = sample_document().to_ics();
    let second = sample_document().to_ics();
    assert_eq!(first.as_bytes(), second.as_bytes());
}
