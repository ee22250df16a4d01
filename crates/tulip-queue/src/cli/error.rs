//! Error types for the dispatch CLI.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ports::ObjectStoreError;
use crate::domain::{ObjectsMapError, QueueError, RecordError};

/// Errors surfaced by the CLI configuration and dispatch flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Config {
        /// Loader error message.
        message: String,
    },
    /// No batch file was configured.
    #[error("missing batch file: pass --batch or set TULIP_BATCH")]
    MissingBatch,
    /// The output path is not valid UTF-8.
    #[error("output path '{}' is not valid UTF-8", .path.display())]
    OutputPath {
        /// Offending path.
        path: PathBuf,
    },
    /// The HTTP client could not be built.
    #[error("failed to build Tulip client: {message}")]
    Client {
        /// Builder error message.
        message: String,
    },
    /// The objects map could not be loaded.
    #[error("objects map error: {source}")]
    ObjectsMap {
        /// Underlying loader error.
        #[from]
        #[source]
        source: ObjectsMapError,
    },
    /// The batch file could not be loaded.
    #[error("batch error: {source}")]
    Batch {
        /// Underlying loader error.
        #[from]
        #[source]
        source: RecordError,
    },
    /// The output store could not be opened.
    #[error("output store error: {source}")]
    Store {
        /// Underlying store error.
        #[from]
        #[source]
        source: ObjectStoreError,
    },
    /// The dispatch cycle was aborted.
    #[error("dispatch aborted: {source}")]
    Dispatch {
        /// Underlying queue error.
        #[from]
        #[source]
        source: QueueError,
    },
}
