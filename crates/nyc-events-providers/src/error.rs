//! Error types for fetching and mapping event records.
//!
//! [`FetchError`] is fatal for a run: nothing is written when the fetcher
//! fails. [`RecordSkipped`] only ever drops a single record.

use std::fmt;
use thiserror::Error;

/// The category of a fetch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorCode {
    /// Connection failed, timed out or the body could not be read.
    NetworkError,
    /// The API rejected the subscription key (401).
    AuthenticationFailed,
    /// The key is valid but lacks access (403).
    AuthorizationFailed,
    /// Too many requests (429).
    RateLimited,
    /// Any other non-success status.
    ServerError,
    /// The body is not JSON or does not have the expected shape.
    InvalidResponse,
}

impl FetchErrorCode {
    /// Returns true if this error is transient and a later run may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns the stable name of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

impl fmt::Display for FetchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised while talking to the events API.
#[derive(Debug, Error)]
pub struct FetchError {
    code: FetchErrorCode,
    message: String,
    /// HTTP status, when a response was received.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    /// Creates a new fetch error with the given code and message.
    pub fn new(code: FetchErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::NetworkError, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::AuthorizationFailed, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::InvalidResponse, message)
    }

    /// Records the HTTP status of the failed response.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> FetchErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns true if a later run may succeed without intervention.
    pub fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {status})")?;
        }
        Ok(())
    }
}

/// A specialized Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Why a single raw record was not turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordSkipped {
    /// No start field under any known key.
    #[error("record has no start time")]
    MissingStart,

    /// A start field exists but its value is not a known timestamp shape.
    #[error("unparseable start time: {value}")]
    UnparseableStart { value: String },

    /// An earlier record in the same run already used this id.
    #[error("duplicate event id: {id}")]
    DuplicateId { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_transient() {
        assert!(FetchErrorCode::NetworkError.is_transient());
        assert!(FetchErrorCode::RateLimited.is_transient());
        assert!(FetchErrorCode::ServerError.is_transient());
        assert!(!FetchErrorCode::AuthenticationFailed.is_transient());
        assert!(!FetchErrorCode::InvalidResponse.is_transient());
    }

    #[test]
    fn error_code_names() {
        assert_eq!(
            FetchErrorCode::AuthenticationFailed.as_str(),
            "authentication_failed"
        );
        assert_eq!(FetchErrorCode::AuthorizationFailed.as_str(), "authorization_failed");
        assert_eq!(FetchErrorCode::InvalidResponse.to_string(), "invalid_response");
    }

    #[test]
    fn fetch_error_creation() {
        let err = FetchError::authentication("subscription key rejected").with_status(401);
        assert_eq!(err.code(), FetchErrorCode::AuthenticationFailed);
        assert_eq!(err.message(), "subscription key rejected");
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_transient());
    }

    #[test]
    fn fetch_error_display() {
        let err = FetchError::server("upstream unavailable").with_status(503);
        assert_eq!(
            err.to_string(),
            "server_error: upstream unavailable (HTTP 503)"
        );
        assert_eq!(
            FetchError::network("connection refused").to_string(),
            "network_error: connection refused"
        );
    }

    #[test]
    fn fetch_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("connection reset");
        let err = FetchError::network("failed to read response").with_source(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn record_skipped_messages() {
        assert_eq!(RecordSkipped::MissingStart.to_string(), "record has no start time");
        assert_eq!(
            RecordSkipped::DuplicateId { id: "nyc-1".into() }.to_string(),
            "duplicate event id: nyc-1"
        );
    }
}
