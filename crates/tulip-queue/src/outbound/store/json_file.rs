//! JSON file object store.
//!
//! Staging takes a snapshot of the object (type, Tulip id, parameters). A
//! commit appends the staged snapshots to the array already in the file and
//! replaces the file atomically.

use std::io;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde_json::Value;
use tracing::debug;

use super::atomic_io::write_atomic;
use crate::domain::ports::{ObjectStore, ObjectStoreError};
use crate::domain::{ObjectSnapshot, QueuedObject};

/// Object store persisting committed objects as a JSON array.
#[derive(Debug)]
pub struct JsonFileObjectStore {
    dir: Dir,
    path: Utf8PathBuf,
    file_name: String,
    staged: Mutex<Vec<ObjectSnapshot>>,
}

impl JsonFileObjectStore {
    /// Open a store writing to `path`. The parent directory must exist; the
    /// file is created on the first commit.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Write`] when `path` has no file name or the
    /// parent directory cannot be opened.
    pub fn open(path: &Utf8Path) -> Result<Self, ObjectStoreError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| ObjectStoreError::write(format!("'{path}' is not a file path")))?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| {
            ObjectStoreError::write(format!("failed to open directory '{parent}': {err}"))
        })?;
        Ok(Self {
            dir,
            path: path.to_path_buf(),
            file_name: file_name.to_owned(),
            staged: Mutex::new(Vec::new()),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Number of snapshots awaiting commit.
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.staged.lock().map_or(0, |staged| staged.len())
    }

    fn read_existing(&self) -> Result<Vec<Value>, ObjectStoreError> {
        let contents = match self.dir.read_to_string(&self.file_name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(ObjectStoreError::write(format!(
                    "failed to read '{}': {err}",
                    self.path
                )));
            }
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|err| {
            ObjectStoreError::write(format!(
                "'{}' does not hold a JSON array: {err}",
                self.path
            ))
        })
    }

    fn lock_staged(&self) -> Result<MutexGuard<'_, Vec<ObjectSnapshot>>, ObjectStoreError> {
        self.staged
            .lock()
            .map_err(|_| ObjectStoreError::write("staging lock poisoned"))
    }
}

#[async_trait]
impl ObjectStore for JsonFileObjectStore {
    async fn stage(&self, object: QueuedObject) -> Result<(), ObjectStoreError> {
        let snapshot = object
            .snapshot()
            .map_err(|err| ObjectStoreError::rejected(err.to_string()))?;
        self.lock_staged()?.push(snapshot);
        Ok(())
    }

    async fn commit(&self) -> Result<(), ObjectStoreError> {
        let mut staged = self.lock_staged()?;
        if staged.is_empty() {
            return Ok(());
        }

        let mut objects = self.read_existing()?;
        for snapshot in staged.iter() {
            let value = serde_json::to_value(snapshot)
                .map_err(|err| ObjectStoreError::write(err.to_string()))?;
            objects.push(value);
        }
        let contents = serde_json::to_string_pretty(&objects)
            .map_err(|err| ObjectStoreError::write(err.to_string()))?;
        write_atomic(&self.dir, &self.file_name, &contents)?;

        debug!(path = %self.path, written = staged.len(), total = objects.len(), "committed objects");
        staged.clear();
        Ok(())
    }
}
