//! CLI support for dispatching a batch file to Tulip.
//!
//! The binary delegates to these functions so the whole flow can be exercised
//! in tests without spawning a subprocess.

use std::sync::Arc;

use camino::Utf8Path;

use crate::config::TulipSettings;
use crate::domain::{DispatchResult, DispatchSummary, ObjectsMap, QueueManager, TulipRecord};
use crate::outbound::store::JsonFileObjectStore;
use crate::outbound::tulip::{TulipHttpClient, TulipHttpIdentity};

mod error;

pub use error::CliError;

/// Outcome of one CLI dispatch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Counts for the completed cycle.
    pub summary: DispatchSummary,
    /// Failures captured during the cycle.
    pub failures: Vec<DispatchResult>,
}

impl DispatchReport {
    /// Whether every queued object was dispatched successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build a queue manager wired to the HTTP client described by `settings`.
///
/// # Errors
///
/// Returns [`CliError::Client`] when the HTTP client cannot be built, or
/// [`CliError::ObjectsMap`] when the configured objects map cannot be loaded.
pub fn build_manager(settings: &TulipSettings) -> Result<QueueManager, CliError> {
    let identity = TulipHttpIdentity {
        user_agent: settings.user_agent().to_owned(),
    };
    let client = TulipHttpClient::with_identity(settings.url(), settings.timeout(), identity)
        .map_err(|err| CliError::Client {
            message: err.to_string(),
        })?;
    let objects_map = settings
        .objects_map()
        .map(ObjectsMap::from_file)
        .transpose()?
        .unwrap_or_default();
    Ok(QueueManager::with_config(
        Arc::new(client),
        objects_map,
        settings.file_upload_path().map(str::to_owned),
    ))
}

/// Dispatch every record in the configured batch file.
///
/// Committed objects are appended to the configured output file.
///
/// # Errors
///
/// Returns [`CliError`] when the configuration, batch file, objects map or
/// output file is unusable, or when the dispatch cycle aborts. Per-object
/// failures are reported in the [`DispatchReport`] instead.
pub async fn run(settings: &TulipSettings) -> Result<DispatchReport, CliError> {
    let batch_path = settings.batch().ok_or(CliError::MissingBatch)?;
    let output = settings.output();
    let output_path = Utf8Path::from_path(&output).ok_or_else(|| CliError::OutputPath {
        path: output.clone(),
    })?;

    let records = TulipRecord::batch_from_file(batch_path)?;
    let mut manager = build_manager(settings)?;
    for record in records {
        manager.enqueue(record.into_queued());
    }

    let store = JsonFileObjectStore::open(output_path)?;
    let summary = manager.dispatch(&store).await?;
    Ok(DispatchReport {
        summary,
        failures: manager.take_results(),
    })
}

/// Render a captured failure as one tab-separated line: URL, status, error.
///
/// The status column reads `-` when no response was received.
#[must_use]
pub fn format_failure(result: &DispatchResult) -> String {
    let status = result
        .response
        .as_ref()
        .map_or_else(|| "-".to_owned(), |response| response.status.to_string());
    format!("{}\t{status}\t{}", result.url, result.failure)
}

#[cfg(test)]
mod tests;
