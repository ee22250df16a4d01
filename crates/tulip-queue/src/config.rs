//! Tulip queue configuration loaded via OrthoConfig.
//!
//! Values come from CLI arguments, `TULIP_*` environment variables and
//! configuration files, in that order of precedence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "tulip-queue/0.1";
const DEFAULT_OUTPUT: &str = "tulip-objects.json";

/// Configuration values controlling Tulip dispatch.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TULIP")]
pub struct TulipSettings {
    /// Tulip API base URL.
    pub url: Option<String>,
    /// Base directory injected into upload-capable objects.
    pub file_upload_path: Option<String>,
    /// Path to the JSON objects map.
    pub objects_map: Option<PathBuf>,
    /// HTTP request timeout in seconds.
    #[ortho_config(default = 30)]
    pub timeout_seconds: u64,
    /// HTTP user agent.
    pub user_agent: Option<String>,
    /// Batch file of records to dispatch.
    pub batch: Option<PathBuf>,
    /// File receiving committed objects.
    pub output: Option<PathBuf>,
}

impl TulipSettings {
    /// Configured base URL, or an empty string when unset.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    /// Configured upload base path.
    #[must_use]
    pub fn file_upload_path(&self) -> Option<&str> {
        self.file_upload_path.as_deref()
    }

    /// Configured objects map path.
    #[must_use]
    pub fn objects_map(&self) -> Option<&Path> {
        self.objects_map.as_deref()
    }

    /// Request timeout. Zero falls back to the default.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        if self.timeout_seconds == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)
        } else {
            Duration::from_secs(self.timeout_seconds)
        }
    }

    /// User agent, falling back to the default.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Configured batch file.
    #[must_use]
    pub fn batch(&self) -> Option<&Path> {
        self.batch.as_deref()
    }

    /// Output file, falling back to the default.
    #[must_use]
    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }
}
