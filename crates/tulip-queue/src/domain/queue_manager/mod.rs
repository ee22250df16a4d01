//! Batched dispatch of queued objects to the Tulip API.
//!
//! The manager drains its queue one object at a time, in enqueue order. Each
//! object is resolved to a service/action pair, its parameters are
//! flattened, and the Tulip client is called once. Successes get their id
//! assigned and are staged in the object store. Failures are captured in the
//! results log together with the original response and never abort the
//! cycle. The store is committed exactly once per cycle that reaches the
//! network stage.
//!
//! Only failures are logged: a queued object without a result entry after
//! a completed cycle was dispatched successfully and staged.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::ports::{
    ObjectStore, ObjectStoreError, RawResponse, ServiceCallFailure, TulipClient,
};
use crate::domain::{
    FlatParameters, ObjectPoisoned, ObjectsMap, QueuedObject, flatten_parameters,
};

/// Errors that abort a dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The client's base endpoint is empty or not an absolute URL.
    #[error("Tulip API endpoint '{endpoint}' is not a valid URL")]
    InvalidEndpoint {
        /// Endpoint the client resolved.
        endpoint: String,
    },
    /// The object store failed to stage or commit.
    #[error(transparent)]
    Store(#[from] ObjectStoreError),
    /// A queued object could not be locked.
    #[error(transparent)]
    ObjectUnavailable(#[from] ObjectPoisoned),
}

/// A captured failure for one queued object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    /// Service URL the object was sent to.
    pub url: String,
    /// Flat parameters that were sent.
    pub parameters: FlatParameters,
    /// Response the failure was raised from, when Tulip answered.
    pub response: Option<RawResponse>,
    /// Raw body of that response, empty when there was none.
    pub response_body: String,
    /// The captured failure, verbatim.
    pub failure: ServiceCallFailure,
}

/// Outcome counts for one dispatch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Objects sent to Tulip.
    pub dispatched: usize,
    /// Objects that received an id and were staged.
    pub staged: usize,
    /// Objects whose failure was appended to the results log.
    pub failed: usize,
}

/// Queue of objects awaiting transmission to Tulip.
pub struct QueueManager {
    client: Arc<dyn TulipClient>,
    objects_map: ObjectsMap,
    file_upload_path: Option<String>,
    queued_objects: Vec<QueuedObject>,
    results: Vec<DispatchResult>,
}

impl QueueManager {
    /// Manager with an empty objects map and no upload base path.
    #[must_use]
    pub fn new(client: Arc<dyn TulipClient>) -> Self {
        Self::with_config(client, ObjectsMap::default(), None)
    }

    /// Manager with an explicit objects map and upload base path.
    #[must_use]
    pub fn with_config(
        client: Arc<dyn TulipClient>,
        objects_map: ObjectsMap,
        file_upload_path: Option<String>,
    ) -> Self {
        Self {
            client,
            objects_map,
            file_upload_path,
            queued_objects: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Objects map used to resolve service/action pairs.
    #[must_use]
    pub const fn objects_map(&self) -> &ObjectsMap {
        &self.objects_map
    }

    /// Upload base path injected into upload-capable objects.
    #[must_use]
    pub fn file_upload_path(&self) -> Option<&str> {
        self.file_upload_path.as_deref()
    }

    /// Append an object to the queue.
    pub fn enqueue(&mut self, object: QueuedObject) {
        self.queued_objects.push(object);
    }

    /// Number of objects awaiting dispatch.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queued_objects.len()
    }

    /// Whether no objects await dispatch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queued_objects.is_empty()
    }

    /// Objects awaiting dispatch, in enqueue order.
    #[must_use]
    pub fn pending(&self) -> &[QueuedObject] {
        &self.queued_objects
    }

    /// Every failure captured so far. Reading does not clear the log.
    #[must_use]
    pub fn results(&self) -> &[DispatchResult] {
        &self.results
    }

    /// Drop every captured failure.
    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    /// Remove and return every captured failure.
    pub fn take_results(&mut self) -> Vec<DispatchResult> {
        std::mem::take(&mut self.results)
    }

    /// Send every queued object to Tulip, then commit the store once.
    ///
    /// The queue is emptied once the cycle completes, whatever the per-object
    /// outcomes were. An empty queue still commits, so changes staged earlier
    /// are flushed.
    ///
    /// # Errors
    ///
    /// - [`QueueError::InvalidEndpoint`] when the client's base endpoint is not
    ///   an absolute URL. Nothing is sent, staged or committed and the queue is
    ///   left as it was.
    /// - [`QueueError::Store`] or [`QueueError::ObjectUnavailable`] abort the
    ///   cycle where they occur. Objects staged before that stay staged and
    ///   the queue is not cleared.
    pub async fn dispatch(
        &mut self,
        store: &dyn ObjectStore,
    ) -> Result<DispatchSummary, QueueError> {
        let endpoint = self.client.service_url("", "");
        if !is_valid_endpoint(&endpoint) {
            warn!(endpoint = %endpoint, "Tulip API endpoint is invalid; dispatch skipped");
            return Err(QueueError::InvalidEndpoint { endpoint });
        }

        let mut summary = DispatchSummary::default();
        let queued = self.queued_objects.clone();
        for object in &queued {
            summary.dispatched += 1;
            match self.dispatch_object(object, store).await? {
                None => summary.staged += 1,
                Some(result) => {
                    summary.failed += 1;
                    self.results.push(result);
                }
            }
        }

        store.commit().await?;
        self.queued_objects.clear();

        info!(
            dispatched = summary.dispatched,
            staged = summary.staged,
            failed = summary.failed,
            "Tulip dispatch cycle completed"
        );
        Ok(summary)
    }

    async fn dispatch_object(
        &self,
        object: &QueuedObject,
        store: &dyn ObjectStore,
    ) -> Result<Option<DispatchResult>, QueueError> {
        let (parameters, uploads) = object.prepare(self.file_upload_path.as_deref())?;
        let pair = self.objects_map.resolve(&object.type_name()?);
        let parameters = flatten_parameters(&parameters);
        let files: FlatParameters = uploads.into_iter().collect();
        let url = self.client.service_url(&pair.service, &pair.action);

        debug!(
            service = %pair.service,
            action = %pair.action,
            parameters = parameters.len(),
            files = files.len(),
            "dispatching queued object"
        );

        match self
            .client
            .call_service(&pair.service, &pair.action, &parameters, &files)
            .await
        {
            Ok(response) => {
                object.assign_tulip_id(response.object_id)?;
                store.stage(object.clone()).await?;
                Ok(None)
            }
            Err(failure) => {
                warn!(url = %url, error = %failure, "Tulip service call failed");
                Ok(Some(DispatchResult {
                    url,
                    parameters,
                    response: failure.response.clone(),
                    response_body: failure.response_body().to_owned(),
                    failure,
                }))
            }
        }
    }
}

impl fmt::Debug for QueueManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueManager")
            .field("objects_map", &self.objects_map)
            .field("file_upload_path", &self.file_upload_path)
            .field("queued", &self.queued_objects.len())
            .field("results", &self.results.len())
            .finish_non_exhaustive()
    }
}

fn is_valid_endpoint(endpoint: &str) -> bool {
    Url::parse(endpoint).is_ok_and(|url| url.has_host())
}
