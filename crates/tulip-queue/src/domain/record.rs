//! Generic queueable record described by JSON.
//!
//! Callers without their own object types describe what to send as
//! `{ "type": "contact", "parameters": { .. }, "uploads": { "cv": "cv.pdf" } }`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{Parameters, QueuedObject, TulipObject, TulipUploadObject};

/// Errors raised while loading record batches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The batch file could not be read.
    #[error("failed to read batch file at '{path}': {message}")]
    Io {
        /// Path of the batch file.
        path: PathBuf,
        /// I/O error description.
        message: String,
    },
    /// The batch JSON is malformed.
    #[error("invalid batch JSON: {message}")]
    Parse {
        /// Parser error description.
        message: String,
    },
}

/// A JSON-described object to send to Tulip.
///
/// # Examples
///
/// ```
/// use tulip_queue::domain::{TulipObject, TulipRecord};
///
/// let record = TulipRecord::new("Contact").with_parameter("name", "Ada");
/// assert_eq!(record.type_name(), "Contact");
/// assert_eq!(record.tulip_parameters()["name"], "Ada");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TulipRecord {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    parameters: Parameters,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    uploads: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tulip_id: Option<String>,
    #[serde(skip)]
    file_upload_path: Option<String>,
}

impl TulipRecord {
    /// Record of `type_name` without parameters.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            parameters: Parameters::new(),
            uploads: BTreeMap::new(),
            tulip_id: None,
            file_upload_path: None,
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Add a named upload.
    #[must_use]
    pub fn with_upload(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.uploads.insert(name.into(), path.into());
        self
    }

    /// Identifier assigned by Tulip, once dispatched.
    #[must_use]
    pub fn tulip_id(&self) -> Option<&str> {
        self.tulip_id.as_deref()
    }

    /// Upload base path injected by the queue manager.
    #[must_use]
    pub fn file_upload_path(&self) -> Option<&str> {
        self.file_upload_path.as_deref()
    }

    /// Wrap the record in its capability variant.
    ///
    /// Records declaring uploads are queued as upload-capable objects.
    #[must_use]
    pub fn into_queued(self) -> QueuedObject {
        if self.uploads.is_empty() {
            QueuedObject::plain(self)
        } else {
            QueuedObject::upload(self)
        }
    }

    /// Parse a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Parse`] when the JSON is not an array of records.
    pub fn batch_from_json(json: &str) -> Result<Vec<Self>, RecordError> {
        serde_json::from_str(json).map_err(|e| RecordError::Parse {
            message: e.to_string(),
        })
    }

    /// Load a JSON array of records from a file.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the file cannot be read or parsed.
    pub fn batch_from_file(path: &Path) -> Result<Vec<Self>, RecordError> {
        let contents = fs::read_to_string(path).map_err(|e| RecordError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::batch_from_json(&contents)
    }
}

impl TulipObject for TulipRecord {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn tulip_parameters(&self) -> Parameters {
        self.parameters.clone()
    }

    fn set_tulip_id(&mut self, tulip_id: String) {
        self.tulip_id = Some(tulip_id);
    }

    fn tulip_id(&self) -> Option<&str> {
        self.tulip_id.as_deref()
    }
}

impl TulipUploadObject for TulipRecord {
    fn set_file_upload_path(&mut self, path: &str) {
        self.file_upload_path = Some(path.to_owned());
    }

    fn tulip_uploads(&self) -> BTreeMap<String, String> {
        let Some(base) = self.file_upload_path.as_deref() else {
            return self.uploads.clone();
        };
        self.uploads
            .iter()
            .map(|(name, path)| {
                let resolved = Path::new(base).join(path);
                (name.clone(), resolved.to_string_lossy().into_owned())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_batches_with_optional_fields() {
        let batch = TulipRecord::batch_from_json(
            r#"[
                { "type": "Contact", "parameters": { "name": "Ada", "tags": ["a", "b"] } },
                { "type": "Document", "uploads": { "file": "cv.pdf" } }
            ]"#,
        )
        .expect("valid batch");

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].tulip_parameters()["tags"], json!(["a", "b"]));
        assert!(!batch[0].clone().into_queued().is_upload());
        assert!(batch[1].clone().into_queued().is_upload());
    }

    #[test]
    fn rejects_records_without_a_type() {
        let err = TulipRecord::batch_from_json(r#"[{ "parameters": {} }]"#)
            .expect_err("type is required");
        assert!(matches!(err, RecordError::Parse { .. }));
    }

    #[test]
    fn uploads_resolve_against_the_injected_base_path() {
        let mut record = TulipRecord::new("Document").with_upload("file", "cv.pdf");
        assert_eq!(record.tulip_uploads()["file"], "cv.pdf");

        record.set_file_upload_path("/srv/uploads");
        assert_eq!(record.file_upload_path(), Some("/srv/uploads"));
        assert_eq!(record.tulip_uploads()["file"], "/srv/uploads/cv.pdf");
    }

    #[test]
    fn absolute_upload_paths_are_kept() {
        let mut record = TulipRecord::new("Document").with_upload("file", "/tmp/cv.pdf");
        record.set_file_upload_path("/srv/uploads");
        assert_eq!(record.tulip_uploads()["file"], "/tmp/cv.pdf");
    }

    #[test]
    fn assigned_ids_are_serialised() {
        let mut record = TulipRecord::new("Contact");
        record.set_tulip_id("42".to_owned());
        let value = serde_json::to_value(&record).expect("serialise");
        assert_eq!(value, json!({ "type": "Contact", "parameters": {}, "tulip_id": "42" }));
    }
}
