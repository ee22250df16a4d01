//! Object type to Tulip service/action mapping.
//!
//! The map is immutable once built. Types without an entry fall back to the
//! lowercased type name and the `save` action.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Action used when no explicit mapping exists.
pub const DEFAULT_ACTION: &str = "save";

/// Tulip service and action addressed for one object type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ServiceAction {
    /// Tulip service name.
    pub service: String,
    /// Tulip action name.
    pub action: String,
}

impl ServiceAction {
    /// Build a service/action pair.
    #[must_use]
    pub fn new(service: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
        }
    }
}

/// Errors raised while loading an objects map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectsMapError {
    /// The map file could not be read.
    #[error("failed to read objects map at '{path}': {message}")]
    Io {
        /// Path of the map file.
        path: PathBuf,
        /// I/O error description.
        message: String,
    },
    /// The map JSON is malformed.
    #[error("invalid objects map JSON: {message}")]
    Parse {
        /// Parser error description.
        message: String,
    },
}

/// Immutable registry from object type name to service/action pair.
///
/// # Examples
///
/// ```
/// use tulip_queue::domain::{ObjectsMap, ServiceAction};
///
/// let map = ObjectsMap::from_iter([("Customer", ServiceAction::new("contact", "save"))]);
/// assert_eq!(map.resolve("Customer"), ServiceAction::new("contact", "save"));
/// assert_eq!(map.resolve("Invoice"), ServiceAction::new("invoice", "save"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectsMap {
    entries: HashMap<String, ServiceAction>,
}

impl ObjectsMap {
    /// Parse a map from `{ "<type>": { "service": "..", "action": ".." } }` JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectsMapError::Parse`] when the JSON does not match that shape.
    pub fn from_json(json: &str) -> Result<Self, ObjectsMapError> {
        let entries: HashMap<String, ServiceAction> =
            serde_json::from_str(json).map_err(|e| ObjectsMapError::Parse {
                message: e.to_string(),
            })?;
        Ok(Self { entries })
    }

    /// Load a map from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectsMapError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ObjectsMapError> {
        let contents = fs::read_to_string(path).map_err(|e| ObjectsMapError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&contents)
    }

    /// Number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no explicit entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the service/action pair for `type_name`.
    ///
    /// Never fails: unmapped types resolve to `(lowercase(type_name), "save")`.
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> ServiceAction {
        self.entries.get(type_name).cloned().unwrap_or_else(|| {
            ServiceAction::new(type_name.to_lowercase(), DEFAULT_ACTION)
        })
    }
}

impl<K: Into<String>> FromIterator<(K, ServiceAction)> for ObjectsMap {
    fn from_iter<I: IntoIterator<Item = (K, ServiceAction)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(type_name, pair)| (type_name.into(), pair))
                .collect(),
        }
    }
}
