//! Raw event records as returned by the events API.
//!
//! The API's field names are not stable across endpoints and versions, so a
//! record is kept as an untyped JSON object and each concept is looked up
//! under several aliases. The first alias holding a non-empty value wins.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ID_KEYS: &[&str] = &["id", "eventId", "guid", "uid"];
const TITLE_KEYS: &[&str] = &["name", "title", "summary"];
const START_KEYS: &[&str] = &["startDate", "start", "startDateTime", "dateTime"];
const END_KEYS: &[&str] = &["endDate", "end", "endDateTime"];
const LOCATION_KEYS: &[&str] = &["location", "address", "venue"];
const DESCRIPTION_KEYS: &[&str] = &["description", "shortDescription"];
const CATEGORY_KEYS: &[&str] = &["categories", "category", "categoryCode"];
const BOROUGH_KEYS: &[&str] = &["boroughs", "borough", "boroughCode"];

/// One event object from an API page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEventRecord(Map<String, Value>);

impl RawEventRecord {
    /// Wraps a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Source identifier; numbers are rendered as decimal strings.
    pub fn id(&self) -> Option<String> {
        self.first_text(ID_KEYS)
    }

    pub fn title(&self) -> Option<String> {
        self.first_text(TITLE_KEYS)
    }

    /// The start value, still unparsed (string or epoch number).
    pub fn start(&self) -> Option<&Value> {
        self.first_present(START_KEYS)
    }

    /// The end value, still unparsed.
    pub fn end(&self) -> Option<&Value> {
        self.first_present(END_KEYS)
    }

    pub fn location(&self) -> Option<String> {
        self.first_text(LOCATION_KEYS)
    }

    pub fn description(&self) -> Option<String> {
        self.first_text(DESCRIPTION_KEYS)
    }

    /// Category codes, from an array or a comma-separated string.
    pub fn categories(&self) -> Vec<String> {
        self.codes(CATEGORY_KEYS)
    }

    /// Borough codes, from an array or a comma-separated string.
    pub fn boroughs(&self) -> Vec<String> {
        self.codes(BOROUGH_KEYS)
    }

    fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| is_present(value))
    }

    fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(scalar_text)
    }

    fn codes(&self, keys: &[&str]) -> Vec<String> {
        let Some(value) = self.first_present(keys) else {
            return Vec::new();
        };
        let parts: Vec<String> = match value {
            Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
            Value::String(s) => s.split(',').map(str::to_string).collect(),
            other => scalar_text(other).into_iter().collect(),
        };
        parts
            .into_iter()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()
    }
}

impl From<Map<String, Value>> for RawEventRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Non-blank string or number as text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
