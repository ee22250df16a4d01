//! In-memory object store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::QueuedObject;
use crate::domain::ports::{ObjectStore, ObjectStoreError};

/// Object store that moves staged objects to an in-memory committed list.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    staged: Mutex<Vec<QueuedObject>>,
    committed: Mutex<Vec<QueuedObject>>,
    commits: AtomicUsize,
}

impl InMemoryObjectStore {
    /// Objects staged since the last commit.
    #[must_use]
    pub fn staged(&self) -> Vec<QueuedObject> {
        lock(&self.staged).map(|staged| staged.clone()).unwrap_or_default()
    }

    /// Every object committed so far, in staging order.
    #[must_use]
    pub fn committed(&self) -> Vec<QueuedObject> {
        lock(&self.committed)
            .map(|committed| committed.clone())
            .unwrap_or_default()
    }

    /// Number of commits performed.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn stage(&self, object: QueuedObject) -> Result<(), ObjectStoreError> {
        lock(&self.staged)?.push(object);
        Ok(())
    }

    async fn commit(&self) -> Result<(), ObjectStoreError> {
        let staged = std::mem::take(&mut *lock(&self.staged)?);
        lock(&self.committed)?.extend(staged);
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ObjectStoreError> {
    mutex
        .lock()
        .map_err(|_| ObjectStoreError::write("in-memory store lock poisoned"))
}
