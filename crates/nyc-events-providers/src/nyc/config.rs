//! Events API configuration.

use std::fmt;
use std::time::Duration;
use url::Url;

/// Configuration for the NYC Events Calendar API client.
#[derive(Clone)]
pub struct NycApiConfig {
    /// Search endpoint.
    pub base_url: Url,

    /// Subscription key sent as `Ocp-Apim-Subscription-Key`.
    pub api_key: String,

    /// Keyword filter; `None` sends no `keywords` parameter.
    pub keywords: Option<String>,

    /// Maximum number of pages fetched per run.
    pub max_pages: u32,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl NycApiConfig {
    /// Default search endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.nyc.gov/calendar/search";

    /// Records returned per page by the API.
    pub const PAGE_SIZE: usize = 10;

    /// Default page cap.
    pub const DEFAULT_MAX_PAGES: u32 = 5;

    /// Default keyword filter.
    pub const DEFAULT_KEYWORDS: &'static str = "free";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given endpoint and key.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(base_url.as_ref())?;
        Ok(Self {
            base_url: parsed,
            api_key: api_key.into(),
            keywords: Some(Self::DEFAULT_KEYWORDS.to_string()),
            max_pages: Self::DEFAULT_MAX_PAGES,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("nyc-events/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the keyword filter. A blank value disables it.
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        let keywords = keywords.into();
        let trimmed = keywords.trim();
        self.keywords = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Sets the page cap.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for NycApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NycApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("keywords", &self.keywords)
            .field("max_pages", &self.max_pages)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
