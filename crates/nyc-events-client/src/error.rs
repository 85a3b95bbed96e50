//! Job error types.

use std::path::PathBuf;

use nyc_events_core::TracingError;
use nyc_events_providers::FetchError;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Errors that abort a run. Any of them leaves the previous output in place.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error(transparent)]
    Tracing(#[from] TracingError),
}

/// Process exit status for a finished run: 0 on success, 1 on any error.
pub fn exit_status<T>(result: &JobResult<T>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_stage() {
        let err = JobError::from(ConfigError::MissingApiKey);
        assert!(err.to_string().starts_with("configuration error: NYC_API_KEY"));

        let err = JobError::from(FetchError::authentication("key rejected").with_status(401));
        assert_eq!(
            err.to_string(),
            "fetch failed: authentication_failed: key rejected (HTTP 401)"
        );

        let err = JobError::Write {
            path: PathBuf::from("/tmp/out.ics"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(err.to_string(), "failed to write /tmp/out.ics: disk full");
    }

    #[test]
    fn exit_status_is_zero_only_on_success() {
        assert_eq!(exit_status(&Ok::<_, JobError>(())), 0);
        assert_eq!(
            exit_status::<()>(&Err(JobError::from(ConfigError::MissingApiKey))),
            1
        );
        assert_eq!(
            exit_status::<()>(&Err(JobError::from(FetchError::authentication("key rejected")))),
            1
        );
    }
}
