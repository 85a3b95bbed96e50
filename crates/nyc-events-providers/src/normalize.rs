//! Raw record to [`NormalizedEvent`] mapping.
//!
//! [`classify_record`] is the pure per-record step: it resolves every
//! optional field, applies the [`FilterCriteria`] and reports why a record
//! was dropped. [`RecordMapper`] runs it over a whole fetch, drops
//! duplicate ids and keeps the counts for the run summary.

use std::collections::HashSet;
use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use nyc_events_core::{NormalizedEvent, PLACEHOLDER_TITLE, from_epoch, parse_timestamp, sanitize_text};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::error::RecordSkipped;
use crate::filter::{FilterCriteria, FilterReason};
use crate::raw_record::RawEventRecord;

/// Why [`classify_record`] produced no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dropped {
    /// The record is malformed.
    Skipped(RecordSkipped),
    /// The record is well-formed but excluded by the criteria.
    Filtered(FilterReason),
}

impl fmt::Display for Dropped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Filtered(reason) => write!(f, "filtered: {reason}"),
        }
    }
}

/// Maps one record, or returns `None` if it is malformed or filtered out.
pub fn map_record(raw: &RawEventRecord, criteria: &FilterCriteria) -> Option<NormalizedEvent> {
    classify_record(raw, criteria).ok()
}

/// Maps one record, reporting why it was dropped.
pub fn classify_record(
    raw: &RawEventRecord,
    criteria: &FilterCriteria,
) -> Result<NormalizedEvent, Dropped> {
    let start_value = raw
        .start()
        .ok_or(Dropped::Skipped(RecordSkipped::MissingStart))?;
    let start = parse_time_value(start_value).ok_or_else(|| {
        Dropped::Skipped(RecordSkipped::UnparseableStart {
            value: value_text(start_value),
        })
    })?;

    let categories = raw.categories();
    criteria
        .check(&categories, &raw.boroughs(), &start)
        .map_err(Dropped::Filtered)?;

    let title = raw
        .title()
        .map(|t| sanitize_text(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
    let id = raw
        .id()
        .map(|id| sanitize_text(&id))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| fallback_id(&title, &start));

    let mut event = NormalizedEvent::new(id, title, start).with_categories(categories);

    if let Some(value) = raw.end() {
        match parse_time_value(value) {
            Some(end) => event = event.with_end(end),
            None => debug!(id = %event.id, end = %value_text(value), "ignoring unparseable end time"),
        }
    }
    if let Some(location) = raw.location() {
        event = event.with_location(sanitize_text(&location));
    }
    if let Some(description) = raw.description() {
        event = event.with_description(sanitize_text(&description));
    }

    Ok(event)
}

/// Parses a start or end value: a timestamp string or a Unix epoch number.
pub fn parse_time_value(value: &Value) -> Option<DateTime<Tz>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(from_epoch),
        _ => None,
    }
}

/// Derives a stable id for records without one.
///
/// `nyc-` followed by the first 16 hex digits of SHA-256 over the title,
/// a unit separator and the RFC 3339 start.
pub fn fallback_id(title: &str, start: &DateTime<Tz>) -> String {
    let digest = Sha256::new()
        .chain_update(title.as_bytes())
        .chain_update("\u{1f}")
        .chain_update(start.to_rfc3339().as_bytes())
        .finalize();
    let hex = format!("{digest:x}");
    format!("nyc-{}", &hex[..16])
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Counts collected while mapping one run's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingReport {
    /// Records seen.
    pub fetched: usize,
    /// Events produced.
    pub mapped: usize,
    /// Malformed records, duplicates included.
    pub skipped: usize,
    /// Records excluded by the criteria.
    pub filtered: usize,
    /// Records dropped because their id was already taken.
    pub duplicates: usize,
}

/// Maps a stream of records, keeping the first event for each id.
#[derive(Debug)]
pub struct RecordMapper<'a> {
    criteria: &'a FilterCriteria,
    seen: HashSet<String>,
    events: Vec<NormalizedEvent>,
    report: MappingReport,
}

impl<'a> RecordMapper<'a> {
    pub fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            criteria,
            seen: HashSet::new(),
            events: Vec::new(),
            report: MappingReport::default(),
        }
    }

    /// Maps one record and keeps the result if it is new.
    pub fn push(&mut self, raw: &RawEventRecord) {
        self.report.fetched += 1;

        let outcome = classify_record(raw, self.criteria).and_then(|event| {
            if self.seen.insert(event.id.clone()) {
                Ok(event)
            } else {
                Err(Dropped::Skipped(RecordSkipped::DuplicateId { id: event.id }))
            }
        });

        match outcome {
            Ok(event) => {
                trace!(id = %event.id, start = %event.start, "mapped record");
                self.report.mapped += 1;
                self.events.push(event);
            }
            Err(Dropped::Skipped(reason)) => {
                debug!(%reason, "skipping record");
                if matches!(reason, RecordSkipped::DuplicateId { .. }) {
                    self.report.duplicates += 1;
                }
                self.report.skipped += 1;
            }
            Err(Dropped::Filtered(reason)) => {
                trace!(%reason, "filtered record");
                self.report.filtered += 1;
            }
        }
    }

    /// Returns the mapped events in arrival order, with the final counts.
    pub fn finish(self) -> (Vec<NormalizedEvent>, MappingReport) {
        (self.events, self.report)
    }
}

/// Maps a batch of records.
pub fn map_records<'r, I>(records: I, criteria: &FilterCriteria) -> (Vec<NormalizedEvent>, MappingReport)
where
    I: IntoIterator<Item = &'r RawEventRecord>,
{
    let mut mapper = RecordMapper::new(criteria);
    for raw in records {
        mapper.push(raw);
    }
    mapper.finish()
}
