//! Category, borough and date-window filtering.

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono_tz::Tz;
use nyc_events_core::DateWindow;
use thiserror::Error;

/// The borough codes understood by the events API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Borough {
    Brooklyn,
    Bronx,
    Manhattan,
    Queens,
    StatenIsland,
    /// Events outside the five boroughs or citywide.
    Other,
}

impl Borough {
    /// Every borough, in code order.
    pub const ALL: [Borough; 6] = [
        Self::Brooklyn,
        Self::Bronx,
        Self::Manhattan,
        Self::Queens,
        Self::StatenIsland,
        Self::Other,
    ];

    /// Returns the API code for this borough.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Brooklyn => "Bk",
            Self::Bronx => "Bx",
            Self::Manhattan => "Mn",
            Self::Queens => "Qn",
            Self::StatenIsland => "Si",
            Self::Other => "Ot",
        }
    }
}

impl fmt::Display for Borough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A borough code outside the documented set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown borough code '{0}' (expected one of Bk, Bx, Mn, Qn, Si, Ot)")]
pub struct UnknownBorough(pub String);

impl FromStr for Borough {
    type Err = UnknownBorough;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| UnknownBorough(code.to_string()))
    }
}

/// Why a well-formed record was left out of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterReason {
    /// None of the record's categories is allowed.
    Category,
    /// None of the record's boroughs is allowed.
    Borough,
    /// The start time falls outside the date window.
    OutsideWindow,
}

impl FilterReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Borough => "borough",
            Self::OutsideWindow => "outside_window",
        }
    }
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints applied to every record while mapping.
///
/// Empty code lists allow everything. Code comparison ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    categories: Vec<String>,
    boroughs: Vec<String>,
    window: DateWindow,
}

impl FilterCriteria {
    /// Creates criteria that only constrain the start time.
    pub fn new(window: DateWindow) -> Self {
        Self {
            categories: Vec::new(),
            boroughs: Vec::new(),
            window,
        }
    }

    /// Sets the allowed category codes.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = clean_codes(categories);
        self
    }

    /// Sets the allowed borough codes.
    pub fn with_boroughs<I, S>(mut self, boroughs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boroughs = clean_codes(boroughs);
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn boroughs(&self) -> &[String] {
        &self.boroughs
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    /// Checks a record's codes and start time against the criteria.
    ///
    /// A record carrying no codes of a kind passes that check, since the
    /// API applies the same code filter server-side.
    pub fn check(
        &self,
        categories: &[String],
        boroughs: &[String],
        start: &DateTime<Tz>,
    ) -> Result<(), FilterReason> {
        if !intersects(&self.categories, categories) {
            return Err(FilterReason::Category);
        }
        if !intersects(&self.boroughs, boroughs) {
            return Err(FilterReason::Borough);
        }
        if !self.window.contains(start) {
            return Err(FilterReason::OutsideWindow);
        }
        Ok(())
    }
}

fn clean_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    codes
        .into_iter()
        .map(Into::into)
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect()
}

fn intersects(allowed: &[String], present: &[String]) -> bool {
    allowed.is_empty()
        || present.is_empty()
        || present
            .iter()
            .any(|code| allowed.iter().any(|a| a.eq_ignore_ascii_case(code)))
}
