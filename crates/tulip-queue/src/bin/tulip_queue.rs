//! Batch dispatcher sending JSON-described records to the Tulip API.
//!
//! This binary delegates to `tulip_queue::cli` for the dispatch flow, keeping
//! the behaviour testable without spawning a process.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use tulip_queue::cli::{CliError, DispatchReport, format_failure, run};
use tulip_queue::config::TulipSettings;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    match dispatch().await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            write_failures(&report);
            ExitCode::FAILURE
        }
        Err(err) => {
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn dispatch() -> Result<DispatchReport, CliError> {
    let settings =
        TulipSettings::load_from_iter(std::env::args_os()).map_err(|err| CliError::Config {
            message: err.to_string(),
        })?;
    run(&settings).await
}

fn write_failures(report: &DispatchReport) {
    let mut out = io::stdout().lock();
    for failure in &report.failures {
        if let Err(err) = writeln!(out, "{}", format_failure(failure)) {
            drop(err);
            return;
        }
    }
}
