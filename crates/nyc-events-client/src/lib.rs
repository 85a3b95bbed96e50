//! NYC events calendar job.
//!
//! Fetches events from the NYC Events Calendar API, maps and filters them,
//! and atomically replaces an iCalendar file. See [`job::run_job`].

pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod output;

pub use config::{ConfigError, JobConfig};
pub use error::{JobError, JobResult, exit_status};
pub use job::{JobSummary, run_job};
