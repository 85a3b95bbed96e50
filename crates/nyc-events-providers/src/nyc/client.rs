//! HTTP client for the NYC Events Calendar search endpoint.
//!
//! The endpoint returns at most [`NycApiConfig::PAGE_SIZE`] records per
//! request. [`NycEventsClient::records`] walks the pages lazily and stops at
//! the first empty or short page, or at the configured page cap.

use futures_util::stream::{self, Stream, TryStreamExt};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use super::config::NycApiConfig;
use crate::error::{FetchError, FetchResult};
use crate::filter::FilterCriteria;
use crate::raw_record::RawEventRecord;

/// Header carrying the subscription key.
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Date format of the `startDate` / `endDate` query parameters.
const QUERY_DATE_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Longest error body echoed into a [`FetchError`] message.
const MAX_ERROR_BODY: usize = 200;

/// Client for the events search endpoint.
#[derive(Debug)]
pub struct NycEventsClient {
    http_client: reqwest::Client,
    config: NycApiConfig,
}

impl NycEventsClient {
    /// Creates a client from the given configuration.
    pub fn new(config: NycApiConfig) -> FetchResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FetchError::network("failed to create HTTP client").with_source(e))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &NycApiConfig {
        &self.config
    }

    /// Streams every record matching `criteria`, page by page.
    ///
    /// Pages are requested only as the stream is polled. The first error
    /// ends the stream.
    pub fn records<'a>(
        &'a self,
        criteria: &'a FilterCriteria,
    ) -> impl Stream<Item = FetchResult<RawEventRecord>> + 'a {
        let first_page = (self.config.max_pages > 0).then_some(1u32);

        let pages = stream::try_unfold(first_page, move |next: Option<u32>| async move {
            let Some(page) = next else {
                return Ok::<_, FetchError>(None);
            };

            let records = self.fetch_page(criteria, page).await?;
            if records.is_empty() {
                return Ok(None);
            }

            let full = records.len() >= NycApiConfig::PAGE_SIZE;
            if full && page >= self.config.max_pages {
                warn!(
                    max_pages = self.config.max_pages,
                    "page cap reached, remaining results are not fetched"
                );
            }
            let next = (full && page < self.config.max_pages).then_some(page + 1);
            Ok(Some((records, next)))
        });

        pages
            .map_ok(|records| stream::iter(records.into_iter().map(Ok::<_, FetchError>)))
            .try_flatten()
    }

    /// Collects every record matching `criteria`.
    pub async fn fetch_all(&self, criteria: &FilterCriteria) -> FetchResult<Vec<RawEventRecord>> {
        self.records(criteria).try_collect().await
    }

    /// Fetches a single page (1-based).
    pub async fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        page_number: u32,
    ) -> FetchResult<Vec<RawEventRecord>> {
        let response = self
            .http_client
            .get(self.config.base_url.clone())
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.api_key)
            .query(&self.page_query(criteria, page_number))
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {e}")
                } else {
                    format!("request failed: {e}")
                };
                FetchError::network(message).with_source(e)
            })?;

        let response = error_for_status(response).await?;

        let body = response.text().await.map_err(|e| {
            FetchError::network("failed to read response body").with_source(e)
        })?;

        let page: EventsPage = serde_json::from_str(&body).map_err(|e| {
            FetchError::invalid_response(format!("failed to parse response: {e}")).with_source(e)
        })?;
        let records = page.events.unwrap_or_default();

        debug!(page = page_number, records = records.len(), "fetched page");
        Ok(records)
    }

    fn page_query(&self, criteria: &FilterCriteria, page_number: u32) -> Vec<(&'static str, String)> {
        let window = criteria.window();
        let mut query = vec![
            ("startDate", window.start.format(QUERY_DATE_FORMAT).to_string()),
            ("endDate", window.end.format(QUERY_DATE_FORMAT).to_string()),
            ("sort", "DATE".to_string()),
        ];
        if let Some(ref keywords) = self.config.keywords {
            query.push(("keywords", keywords.clone()));
        }
        query.push(("pageNumber", page_number.to_string()));
        query.extend(criteria.categories().iter().map(|c| ("categories", c.clone())));
        query.extend(criteria.boroughs().iter().map(|b| ("boroughs", b.clone())));
        query
    }
}

/// Maps non-success statuses to errors.
async fn error_for_status(response: reqwest::Response) -> FetchResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error = match status {
        StatusCode::UNAUTHORIZED => FetchError::authentication(
            "subscription key rejected, check NYC_API_KEY and that the subscription is active",
        ),
        StatusCode::FORBIDDEN => {
            FetchError::authorization("subscription does not grant access to the events API")
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            FetchError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {s} seconds"))
                    .unwrap_or_default()
            ))
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            FetchError::server(format!("API error ({status}): {}", body.trim()))
        }
    };

    Err(error.with_status(status.as_u16()))
}

/// Body of one search response.
#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    events: Option<Vec<RawEventRecord>>,
}
