//! Job configuration.
//!
//! Raw CLI/environment values are validated once into a [`JobConfig`]
//! before any network call is made.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use nyc_events_core::DateWindow;
use nyc_events_providers::{Borough, FilterCriteria, NycApiConfig};
use thiserror::Error;
use tracing::warn;

use crate::cli::Cli;

/// Errors raised while validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NYC_API_KEY must be set to a non-empty subscription key")]
    MissingApiKey,

    #[error("DAYS_AHEAD must be a positive integer, got '{value}'")]
    InvalidDaysAhead { value: String },

    #[error("MAX_PAGES must be a positive integer, got '{value}'")]
    InvalidMaxPages { value: String },

    #[error("HTTP_TIMEOUT_SECS must be a positive integer, got '{value}'")]
    InvalidTimeout { value: String },

    #[error("invalid API URL '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Events API settings.
    pub api: NycApiConfig,
    /// Allowed category codes, empty for all.
    pub categories: Vec<String>,
    /// Allowed borough codes, empty for all.
    pub boroughs: Vec<String>,
    /// Length of the date window.
    pub days_ahead: u32,
    /// Calendar file to write.
    pub output_path: PathBuf,
    /// Calendar display name.
    pub calendar_name: String,
}

impl JobConfig {
    /// Validates parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let days_ahead =
            parse_positive(&cli.days_ahead).ok_or_else(|| ConfigError::InvalidDaysAhead {
                value: cli.days_ahead.clone(),
            })?;
        let max_pages =
            parse_positive(&cli.max_pages).ok_or_else(|| ConfigError::InvalidMaxPages {
                value: cli.max_pages.clone(),
            })?;
        let timeout_secs =
            parse_positive(&cli.timeout_secs).ok_or_else(|| ConfigError::InvalidTimeout {
                value: cli.timeout_secs.clone(),
            })?;

        let mut api = NycApiConfig::new(cli.api_url.trim(), api_key)
            .map_err(|source| ConfigError::InvalidApiUrl {
                url: cli.api_url.clone(),
                source,
            })?
            .with_max_pages(max_pages)
            .with_timeout(Duration::from_secs(u64::from(timeout_secs)));
        if let Some(ref keywords) = cli.keywords {
            api = api.with_keywords(keywords);
        }

        Ok(Self {
            api,
            categories: parse_comma_separated(cli.categories.as_deref()),
            boroughs: canonical_boroughs(parse_comma_separated(cli.boroughs.as_deref())),
            days_ahead,
            output_path: cli.output.clone(),
            calendar_name: cli.calendar_name.clone(),
        })
    }

    /// Builds the filter for a run starting at `now`.
    pub fn criteria(&self, now: DateTime<Utc>) -> FilterCriteria {
        FilterCriteria::new(DateWindow::days_ahead(now, self.days_ahead))
            .with_categories(self.categories.iter().cloned())
            .with_boroughs(self.boroughs.iter().cloned())
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// Splits a comma-separated list, dropping blank entries.
pub fn parse_comma_separated(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes known borough codes to their canonical spelling.
///
/// Unknown codes are kept as given, with a warning.
pub fn canonical_boroughs(codes: Vec<String>) -> Vec<String> {
    codes
        .into_iter()
        .map(|code| match code.parse::<Borough>() {
            Ok(borough) => borough.code().to_string(),
            Err(e) => {
                warn!(code = %code, "{e}");
                code
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["nyc-events"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    mod validation {
        use super::*;

        #[test]
        fn defaults() {
            let config = JobConfig::from_cli(&cli(&["--api-key", "secret"])).unwrap();
            assert_eq!(config.api.api_key, "secret");
            assert_eq!(config.days_ahead, 30);
            assert_eq!(config.api.max_pages, 5);
            assert_eq!(config.api.timeout, Duration::from_secs(30));
            assert_eq!(config.calendar_name, "NYC Events");
        }

        #[test]
        fn blank_api_key_is_missing() {
            let err = JobConfig::from_cli(&cli(&["--api-key", "   "])).unwrap_err();
            assert!(matches!(err, ConfigError::MissingApiKey));
        }

        #[test]
        fn days_ahead_bounds() {
            for bad in ["0", "abc", "1.5", "4294967296"] {
                let err = JobConfig::from_cli(&cli(&["--api-key", "k", "--days-ahead", bad]))
                    .unwrap_err();
                assert!(
                    matches!(err, ConfigError::InvalidDaysAhead { ref value } if value == bad),
                    "{bad}: {err}"
                );
            }
            for (good, days) in [("1", 1), ("400", 400), ("4294967295", u32::MAX)] {
                let config =
                    JobConfig::from_cli(&cli(&["--api-key", "k", "--days-ahead", good])).unwrap();
                assert_eq!(config.days_ahead, days);
            }
        }

        #[test]
        fn huge_days_ahead_still_builds_a_window() {
            let config =
                JobConfig::from_cli(&cli(&["--api-key", "k", "--days-ahead", "4294967295"]))
                    .unwrap();
            let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
            let criteria = config.criteria(now);
            assert_eq!(criteria.window().start, now);
            assert!(criteria.window().end > criteria.window().start);
        }

        #[test]
        fn invalid_max_pages() {
            let err =
                JobConfig::from_cli(&cli(&["--api-key", "k", "--max-pages", "0"])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidMaxPages { .. }));
        }

        #[test]
        fn invalid_timeout() {
            let err = JobConfig::from_cli(&cli(&["--api-key", "k", "--timeout-secs", "soon"]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
        }

        #[test]
        fn invalid_api_url() {
            let err = JobConfig::from_cli(&cli(&["--api-key", "k", "--api-url", "not a url"]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidApiUrl { .. }));
        }

        #[test]
        fn keywords_override_and_disable() {
            let config =
                JobConfig::from_cli(&cli(&["--api-key", "k", "--keywords", "jazz"])).unwrap();
            assert_eq!(config.api.keywords.as_deref(), Some("jazz"));

            let config = JobConfig::from_cli(&cli(&["--api-key", "k", "--keywords", ""])).unwrap();
            assert!(config.api.keywords.is_none());
        }
    }

    mod lists {
        use super::*;

        #[test]
        fn comma_separated_values() {
            assert_eq!(
                parse_comma_separated(Some(" Art, Music,,  ")),
                vec!["Art", "Music"]
            );
            assert!(parse_comma_separated(None).is_empty());
            assert!(parse_comma_separated(Some("")).is_empty());
        }

        #[test]
        fn boroughs_are_canonicalized() {
            let codes = vec!["mn".to_string(), "BK".to_string(), "Jersey".to_string()];
            assert_eq!(canonical_boroughs(codes), vec!["Mn", "Bk", "Jersey"]);
        }

        #[test]
        fn criteria_from_config() {
            let config = JobConfig::from_cli(&cli(&[
                "--api-key",
                "k",
                "--categories",
                "Art",
                "--boroughs",
                "qn",
                "--days-ahead",
                "7",
            ]))
            .unwrap();
            let now = Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap();
            let criteria = config.criteria(now);

            assert_eq!(criteria.categories(), ["Art"]);
            assert_eq!(criteria.boroughs(), ["Qn"]);
            assert_eq!(criteria.window().duration(), chrono::Duration::days(7));
        }
    }
}
