//! The fetch, map and write pipeline.

use std::path::PathBuf;
use std::pin::pin;

use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use nyc_events_core::CalendarDocument;
use nyc_events_providers::{MappingReport, NycEventsClient, RecordMapper};
use tracing::{debug, info, warn};

use crate::config::JobConfig;
use crate::error::{JobError, JobResult};
use crate::output::write_atomic;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    /// Per-record counts from the mapper.
    pub report: MappingReport,
    /// Events written to the calendar.
    pub written: usize,
    /// File that was replaced.
    pub output_path: PathBuf,
}

/// Runs one job with the date window starting at `now`.
///
/// The output file is only touched after every page was fetched, so a
/// failed run leaves the previous calendar in place.
pub async fn run_job(config: &JobConfig, now: DateTime<Utc>) -> JobResult<JobSummary> {
    let criteria = config.criteria(now);
    info!(
        window = %criteria.window(),
        categories = ?criteria.categories(),
        boroughs = ?criteria.boroughs(),
        "fetching events"
    );

    let client = NycEventsClient::new(config.api.clone())?;
    debug!(api = ?client.config(), "events client ready");
    let mut records = pin!(client.records(&criteria));
    let mut mapper = RecordMapper::new(&criteria);
    while let Some(raw) = records.try_next().await? {
        mapper.push(&raw);
    }
    let (events, report) = mapper.finish();

    if report.fetched == 0 {
        warn!("no events fetched, check the filters or widen the date window");
    }

    let document = CalendarDocument::new(&config.calendar_name, events);
    write_atomic(&config.output_path, &document.to_ics()).map_err(|source| JobError::Write {
        path: config.output_path.clone(),
        source,
    })?;

    info!(
        fetched = report.fetched,
        written = document.len(),
        skipped = report.skipped,
        filtered = report.filtered,
        duplicates = report.duplicates,
        path = %config.output_path.display(),
        "calendar written"
    );

    Ok(JobSummary {
        report,
        written: document.len(),
        output_path: config.output_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_status;
    use chrono::TimeZone;
    use nyc_events_core::{DEFAULT_CALENDAR_NAME, read_calendar};
    use nyc_events_providers::{FetchErrorCode, NycApiConfig};
    use serde_json::{Value, json};
    use std::fs;
    use std::path::Path;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 25, 12, 0, 0).unwrap()
    }

    fn config(server: &MockServer, output_path: &Path) -> JobConfig {
        JobConfig {
            api: NycApiConfig::new(format!("{}/calendar/search", server.uri()), "test-key")
                .unwrap(),
            categories: Vec::new(),
            boroughs: Vec::new(),
            days_ahead: 30,
            output_path: output_path.to_path_buf(),
            calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
        }
    }

    async fn serve(server: &MockServer, events: Value) {
        Mock::given(method("GET"))
            .and(query_param("pageNumber", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "events": events })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn writes_sorted_calendar() {
        let server = MockServer::start().await;
        serve(
            &server,
            json!([
                {"id": "late", "name": "Late Show", "startDate": "2025-06-02T21:00:00-04:00"},
                {"id": "early", "name": "Sunrise Yoga", "startDate": "2025-06-01T06:30:00-04:00",
                 "endDate": "2025-06-01T07:30:00-04:00", "location": "Central Park"},
                {"id": "broken", "name": "No time"}
            ]),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyc_events.ics");

        let summary = run_job(&config(&server, &path), now()).await.unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.report.fetched, 3);
        assert_eq!(summary.report.skipped, 1);

        let parsed = read_calendar(&fs::read_to_string(&path).unwrap()).unwrap();
        let ids: Vec<&str> = parsed.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert_eq!(parsed.events[0].location, "Central Park");
        assert_eq!(parsed.name.as_deref(), Some("NYC Events"));
    }

    #[tokio::test]
    async fn missing_end_defaults_to_one_hour() {
        let server = MockServer::start().await;
        serve(
            &server,
            json!([{"id": "talk", "name": "Talk", "startDate": "2025-06-01T18:00:00-04:00"}]),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyc_events.ics");

        run_job(&config(&server, &path), now()).await.unwrap();

        let ics = fs::read_to_string(&path).unwrap();
        assert!(ics.contains("DTSTART;TZID=America/New_York:20250601T180000\r\n"));
        assert!(ics.contains("DTEND;TZID=America/New_York:20250601T190000\r\n"));
        let parsed = read_calendar(&ics).unwrap();
        assert_eq!(parsed.events[0].end.to_rfc3339(), "2025-06-01T19:00:00-04:00");
    }

    #[tokio::test]
    async fn empty_upstream_writes_empty_calendar() {
        let server = MockServer::start().await;
        serve(&server, json!([])).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyc_events.ics");

        let result = run_job(&config(&server, &path), now()).await;
        assert_eq!(exit_status(&result), 0);

        let summary = result.unwrap();
        assert_eq!(summary.written, 0);
        let ics = fs::read_to_string(&path).unwrap();
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(!ics.contains("BEGIN:VEVENT"));
    }

    #[tokio::test]
    async fn unauthorized_leaves_previous_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyc_events.ics");
        fs::write(&path, "previous calendar").unwrap();

        let result = run_job(&config(&server, &path), now()).await;
        assert_eq!(exit_status(&result), 1);

        match result.unwrap_err() {
            JobError::Fetch(e) => assert_eq!(e.code(), FetchErrorCode::AuthenticationFailed),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous calendar");
    }

    #[tokio::test]
    async fn repeated_runs_are_byte_identical() {
        let server = MockServer::start().await;
        serve(
            &server,
            json!([
                {"name": "Poetry, Prose; More", "startDate": "2025-06-03T19:00:00",
                 "description": "Open mic\nAll welcome", "categories": "Literature,Free"},
                {"id": 42, "name": "Concert", "startDate": "06/04/2025 8:00 PM"}
            ]),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyc_events.ics");
        let config = config(&server, &path);

        run_job(&config, now()).await.unwrap();
        let first = fs::read(&path).unwrap();
        run_job(&config, now()).await.unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let server = MockServer::start().await;
        serve(&server, json!([])).await;
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let path = blocker.join("nyc_events.ics");

        let err = run_job(&config(&server, &path), now()).await.unwrap_err();
        assert!(matches!(err, JobError::Write { .. }), "{err}");
    }
}
