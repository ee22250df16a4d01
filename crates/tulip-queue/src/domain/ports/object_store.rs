//! Driven port for persisting objects after Tulip assigned their ids.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::QueuedObject;

define_port_error! {
    /// Errors surfaced by object store adapters.
    pub enum ObjectStoreError {
        /// The store refused to stage the object.
        Rejected {
            /// Reason the object was refused.
            message: String,
        } => "object store rejected the object: {message}",
        /// Staged changes could not be written.
        Write {
            /// Write failure detail.
            message: String,
        } => "object store failed to write staged objects: {message}",
    }
}

/// Port for staging objects and committing them in one operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stage an object for persistence.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Rejected`] when the store cannot hold the object.
    async fn stage(&self, object: QueuedObject) -> Result<(), ObjectStoreError>;

    /// Persist every staged object.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Write`] when the staged objects cannot be written.
    async fn commit(&self) -> Result<(), ObjectStoreError>;
}
