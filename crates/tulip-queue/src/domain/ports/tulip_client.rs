//! Driven port for calling Tulip API services.
//!
//! The domain owns the call shape and the success/failure contract, so the
//! queue manager never sees transport details. Adapters decode the Tulip
//! envelope and hand back either the assigned object id or a captured failure
//! that still carries the original response.

use async_trait::async_trait;
use serde::Serialize;

use super::define_port_error;
use crate::domain::FlatParameters;

/// Raw HTTP response kept verbatim for later inspection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in received order.
    pub headers: Vec<(String, String)>,
    /// Undecoded response body.
    pub body: String,
}

impl RawResponse {
    /// Build a response without headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use tulip_queue::domain::ports::RawResponse;
    ///
    /// let response = RawResponse::new(403, "<response code=\"1001\"/>");
    /// assert_eq!(response.status, 403);
    /// assert!(response.headers.is_empty());
    /// ```
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Successful service call: the id Tulip assigned plus the response it came in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    /// Identifier assigned to the object by Tulip.
    pub object_id: String,
    /// Response the identifier was decoded from.
    pub response: RawResponse,
}

define_port_error! {
    /// Failure kinds a Tulip client adapter can report.
    pub enum TulipClientError {
        /// Tulip refused the caller (envelope code 1001 or HTTP 401/403).
        NotAuthorized {
            /// Error text returned by Tulip.
            message: String,
        } => "not authorized to access the Tulip API: {message}",
        /// Tulip answered with a non-success envelope code.
        Rejected {
            /// Envelope code.
            code: u32,
            /// Error text returned by Tulip.
            message: String,
        } => "Tulip API rejected the call with code {code}: {message}",
        /// Tulip failed server-side without a decodable envelope.
        Server {
            /// Status and body preview.
            message: String,
        } => "Tulip API server error: {message}",
        /// The response could not be decoded or carried no object id.
        InvalidResponse {
            /// Decoder detail.
            message: String,
        } => "invalid Tulip API response: {message}",
        /// No response was received.
        Transport {
            /// Transport detail.
            message: String,
        } => "Tulip API transport failed: {message}",
    }
}

/// Captured failure of one service call.
///
/// `response` is `None` only when the call failed before Tulip answered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct ServiceCallFailure {
    /// What went wrong.
    pub error: TulipClientError,
    /// Response the failure was raised from, when one exists.
    pub response: Option<RawResponse>,
}

impl ServiceCallFailure {
    /// Failure raised from a received response.
    #[must_use]
    pub fn with_response(error: TulipClientError, response: RawResponse) -> Self {
        Self {
            error,
            response: Some(response),
        }
    }

    /// Failure raised before any response was received.
    #[must_use]
    pub fn without_response(error: TulipClientError) -> Self {
        Self {
            error,
            response: None,
        }
    }

    /// Body of the captured response, or an empty string.
    #[must_use]
    pub fn response_body(&self) -> &str {
        self.response
            .as_ref()
            .map_or("", |response| response.body.as_str())
    }
}

/// Port for calling one Tulip service action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TulipClient: Send + Sync {
    /// Resolve the endpoint URL of a service action.
    ///
    /// Called with empty arguments, this returns the base endpoint; the queue
    /// manager uses that to check the configuration.
    fn service_url(&self, service: &str, action: &str) -> String;

    /// Call `service`/`action` with flat form parameters and named upload
    /// file paths.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceCallFailure`] carrying the original response when
    /// Tulip rejects the call or answers with something undecodable.
    async fn call_service(
        &self,
        service: &str,
        action: &str,
        parameters: &FlatParameters,
        files: &FlatParameters,
    ) -> Result<ServiceResponse, ServiceCallFailure>;
}
