//! Command-line interface definition.
//!
//! Every setting can also come from the environment (or a `.env` file),
//! which is how the scheduled job is normally configured.

use std::path::PathBuf;

use clap::Parser;
use nyc_events_core::{DEFAULT_CALENDAR_NAME, TracingConfig, TracingOutputFormat};
use nyc_events_providers::NycApiConfig;

/// nyc-events - Build an iCalendar feed from the NYC Events Calendar API
#[derive(Debug, Parser)]
#[command(name = "nyc-events")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// NYC API subscription key
    #[arg(long, env = "NYC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Comma-separated category codes to include (all when empty)
    #[arg(long, env = "CATEGORIES")]
    pub categories: Option<String>,

    /// Comma-separated borough codes to include: Bk, Bx, Mn, Qn, Si, Ot
    #[arg(long, env = "BOROUGHS")]
    pub boroughs: Option<String>,

    /// Number of days ahead to include
    #[arg(long, env = "DAYS_AHEAD", default_value = "30")]
    pub days_ahead: String,

    /// Keyword filter sent to the API (default "free"; empty disables)
    #[arg(long, env = "KEYWORDS")]
    pub keywords: Option<String>,

    /// Maximum number of result pages to fetch
    #[arg(long, env = "MAX_PAGES", default_value = "5")]
    pub max_pages: String,

    /// Events search endpoint
    #[arg(long, env = "NYC_API_URL", default_value = NycApiConfig::DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: String,

    /// Path of the calendar file to write
    #[arg(long, short, env = "OUTPUT_PATH", default_value = "nyc_events.ics")]
    pub output: PathBuf,

    /// Calendar display name (X-WR-CALNAME)
    #[arg(long, env = "CALENDAR_NAME", default_value = DEFAULT_CALENDAR_NAME)]
    pub calendar_name: String,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log format: pretty, compact or json
    #[arg(long, env = "LOG_FORMAT", default_value = "compact")]
    pub log_format: TracingOutputFormat,
}

impl Cli {
    /// Returns the tracing setup selected by `--debug` and `--log-format`.
    pub fn tracing_config(&self) -> TracingConfig {
        let config = if self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::job()
        };
        config.with_format(self.log_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "nyc-events",
            "--api-key",
            "k",
            "--categories",
            "Art,Music",
            "--days-ahead",
            "14",
            "-o",
            "out/calendar.ics",
            "--log-format",
            "json",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(cli.categories.as_deref(), Some("Art,Music"));
        assert_eq!(cli.days_ahead, "14");
        assert_eq!(cli.output, PathBuf::from("out/calendar.ics"));
        assert_eq!(cli.log_format, TracingOutputFormat::Json);
        assert!(cli.debug);
    }

    #[test]
    fn tracing_config_follows_flags() {
        let cli = Cli::try_parse_from(["nyc-events", "-v", "--log-format", "pretty"]).unwrap();
        let config = cli.tracing_config();
        assert_eq!(config.default_level, Level::DEBUG);
        assert_eq!(config.output_format, TracingOutputFormat::Pretty);
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["nyc-events", "--log-format", "xml"]).is_err());
    }
}
