//! Queueable object capabilities.
//!
//! Objects are owned by the caller. The queue holds shared handles so the
//! caller observes the assigned Tulip id after a dispatch cycle.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use super::Parameters;

/// An object that can be sent to the Tulip API.
pub trait TulipObject: Send {
    /// Stable type identifier used to look up the service/action pair.
    fn type_name(&self) -> &str;

    /// Parameters to send, possibly nested.
    fn tulip_parameters(&self) -> Parameters;

    /// Store the identifier Tulip assigned to this object.
    fn set_tulip_id(&mut self, tulip_id: String);

    /// Identifier assigned by Tulip, for objects that expose it.
    fn tulip_id(&self) -> Option<&str> {
        None
    }
}

/// An object that also uploads local files.
pub trait TulipUploadObject: TulipObject {
    /// Set the base directory the upload paths are resolved against.
    fn set_file_upload_path(&mut self, path: &str);

    /// Named file paths to upload.
    fn tulip_uploads(&self) -> BTreeMap<String, String>;
}

/// Shared handle to a plain object.
pub type SharedTulipObject = Arc<Mutex<dyn TulipObject>>;

/// Shared handle to an upload-capable object.
pub type SharedTulipUploadObject = Arc<Mutex<dyn TulipUploadObject>>;

/// A queued object tagged with its capability set.
#[derive(Clone)]
pub enum QueuedObject {
    /// Object without uploads.
    Plain(SharedTulipObject),
    /// Object carrying file uploads.
    Upload(SharedTulipUploadObject),
}

/// Point-in-time view of a queued object, as written by file stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSnapshot {
    /// Object type identifier.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Identifier assigned by Tulip, when exposed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tulip_id: Option<String>,
    /// Unflattened parameters.
    pub parameters: Parameters,
}

/// An object handle whose lock was poisoned by a panicking holder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("queued object is unavailable: lock poisoned")]
pub struct ObjectPoisoned;

impl QueuedObject {
    /// Queue a plain object by value.
    ///
    /// # Examples
    ///
    /// ```
    /// use tulip_queue::domain::{QueuedObject, TulipRecord};
    ///
    /// let queued = QueuedObject::plain(TulipRecord::new("contact"));
    /// assert!(!queued.is_upload());
    /// ```
    #[must_use]
    pub fn plain<T: TulipObject + 'static>(object: T) -> Self {
        Self::Plain(Arc::new(Mutex::new(object)))
    }

    /// Queue an upload-capable object by value.
    #[must_use]
    pub fn upload<T: TulipUploadObject + 'static>(object: T) -> Self {
        Self::Upload(Arc::new(Mutex::new(object)))
    }

    /// Whether the object carries uploads.
    #[must_use]
    pub const fn is_upload(&self) -> bool {
        matches!(self, Self::Upload(_))
    }

    /// Whether both handles point at the same object.
    #[must_use]
    pub fn same_object(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Plain(left), Self::Plain(right)) => Arc::ptr_eq(left, right),
            (Self::Upload(left), Self::Upload(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Type identifier of the wrapped object.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectPoisoned`] when the object lock is poisoned.
    pub fn type_name(&self) -> Result<String, ObjectPoisoned> {
        match self {
            Self::Plain(object) => Ok(lock(object)?.type_name().to_owned()),
            Self::Upload(object) => Ok(lock(object)?.type_name().to_owned()),
        }
    }

    /// Collect the parameters and uploads to send.
    ///
    /// Upload-capable objects receive `file_upload_path` first, so their
    /// parameters and upload paths can depend on it. Plain objects report no
    /// uploads.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectPoisoned`] when the object lock is poisoned.
    pub fn prepare(
        &self,
        file_upload_path: Option<&str>,
    ) -> Result<(Parameters, BTreeMap<String, String>), ObjectPoisoned> {
        match self {
            Self::Plain(object) => Ok((lock(object)?.tulip_parameters(), BTreeMap::new())),
            Self::Upload(object) => {
                let mut guard = lock(object)?;
                if let Some(path) = file_upload_path {
                    guard.set_file_upload_path(path);
                }
                Ok((guard.tulip_parameters(), guard.tulip_uploads()))
            }
        }
    }

    /// Assign the Tulip id.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectPoisoned`] when the object lock is poisoned.
    pub fn assign_tulip_id(&self, tulip_id: String) -> Result<(), ObjectPoisoned> {
        match self {
            Self::Plain(object) => lock(object)?.set_tulip_id(tulip_id),
            Self::Upload(object) => lock(object)?.set_tulip_id(tulip_id),
        }
        Ok(())
    }

    /// Capture the object's current type, id and parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectPoisoned`] when the object lock is poisoned.
    pub fn snapshot(&self) -> Result<ObjectSnapshot, ObjectPoisoned> {
        let (type_name, tulip_id, parameters) = match self {
            Self::Plain(object) => {
                let guard = lock(object)?;
                let tulip_id = guard.tulip_id().map(str::to_owned);
                (guard.type_name().to_owned(), tulip_id, guard.tulip_parameters())
            }
            Self::Upload(object) => {
                let guard = lock(object)?;
                let tulip_id = guard.tulip_id().map(str::to_owned);
                (guard.type_name().to_owned(), tulip_id, guard.tulip_parameters())
            }
        };
        Ok(ObjectSnapshot {
            type_name,
            tulip_id,
            parameters,
        })
    }
}

impl fmt::Debug for QueuedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = if self.is_upload() { "Upload" } else { "Plain" };
        let type_name = self
            .type_name()
            .unwrap_or_else(|_| "<poisoned>".to_owned());
        f.debug_tuple(variant).field(&type_name).finish()
    }
}

fn lock<T: ?Sized>(object: &Mutex<T>) -> Result<MutexGuard<'_, T>, ObjectPoisoned> {
    object.lock().map_err(|_| ObjectPoisoned)
}
