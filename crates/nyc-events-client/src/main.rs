//! nyc-events entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing::{debug, warn};

use nyc_events_client::cli::Cli;
use nyc_events_client::{JobConfig, JobError, JobResult, JobSummary, exit_status, run_job};
use nyc_events_core::init_tracing;

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = run(cli, dotenv);
    if let Err(ref e) = result {
        eprintln!("error: {}", e);
    }
    ExitCode::from(exit_status(&result))
}

fn run(cli: Cli, dotenv: Result<PathBuf, dotenvy::Error>) -> JobResult<JobSummary> {
    init_tracing(cli.tracing_config())?;

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("ignoring environment file: {e}"),
    }

    let config = JobConfig::from_cli(&cli)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(JobError::Runtime)?;
    runtime.block_on(run_job(&config, Utc::now()))
}
