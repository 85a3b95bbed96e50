//! Fetching and mapping of NYC Events Calendar records.
//!
//! - [`NycEventsClient`] - paginated client for the events search API
//! - [`RawEventRecord`] - an untyped event object as returned by the API
//! - [`FilterCriteria`] - category, borough and date-window constraints
//! - [`classify_record`] / [`RecordMapper`] - conversion to [`NormalizedEvent`]
//!
//! ```text
//!  events API ──► NycEventsClient::records() ──► RawEventRecord
//!                                                     │
//!                                    classify_record(&FilterCriteria)
//!                                                     │
//!                                                     ▼
//!                                              NormalizedEvent
//! ```
//!
//! [`NormalizedEvent`]: nyc_events_core::NormalizedEvent

pub mod error;
pub mod filter;
pub mod normalize;
pub mod nyc;
pub mod raw_record;

pub use error::{FetchError, FetchErrorCode, FetchResult, RecordSkipped};
pub use filter::{Borough, FilterCriteria, FilterReason, UnknownBorough};
pub use normalize::{
    Dropped, MappingReport, RecordMapper, classify_record, fallback_id, map_record, map_records,
    parse_time_value,
};
pub use nyc::{NycApiConfig, NycEventsClient};
pub use raw_record::RawEventRecord;
