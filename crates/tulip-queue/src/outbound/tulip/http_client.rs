//! Reqwest-backed Tulip API client adapter.
//!
//! This adapter owns transport details only: form and multipart encoding,
//! upload file reading, timeout handling, and decoding the XML envelope into
//! either an object id or a captured failure that keeps the raw response.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

use super::dto::ResponseEnvelopeDto;
use crate::domain::FlatParameters;
use crate::domain::ports::{
    RawResponse, ServiceCallFailure, ServiceResponse, TulipClient, TulipClientError,
};

const DEFAULT_USER_AGENT: &str = "tulip-queue/0.1";

/// Outbound identity sent with every Tulip request.
pub struct TulipHttpIdentity {
    /// HTTP user-agent sent to Tulip.
    pub user_agent: String,
}

impl Default for TulipHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Tulip client adapter that POSTs each service call to `{base}/api/{service}/{action}`.
pub struct TulipHttpClient {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl TulipHttpClient {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// The base URL is not validated here; the queue manager refuses to
    /// dispatch through a client whose base endpoint is not an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(base_url, timeout, TulipHttpIdentity::default())
    }

    /// Build an adapter with an explicit outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        base_url: impl Into<String>,
        timeout: Duration,
        identity: TulipHttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            user_agent: identity.user_agent,
        })
    }

    /// Base URL the service URLs are built from.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TulipClient for TulipHttpClient {
    fn service_url(&self, service: &str, action: &str) -> String {
        format!(
            "{}/api/{service}/{action}",
            self.base_url.trim_end_matches('/')
        )
    }

    async fn call_service(
        &self,
        service: &str,
        action: &str,
        parameters: &FlatParameters,
        files: &FlatParameters,
    ) -> Result<ServiceResponse, ServiceCallFailure> {
        let request = self
            .client
            .post(self.service_url(service, action))
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/xml");
        let request = if files.is_empty() {
            request.form(parameters)
        } else {
            request.multipart(build_multipart(parameters, files).await?)
        };

        let response = request
            .send()
            .await
            .map_err(|error| ServiceCallFailure::without_response(map_transport_error(&error)))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|error| ServiceCallFailure::without_response(map_transport_error(&error)))?;

        decode_response(RawResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

async fn build_multipart(
    parameters: &FlatParameters,
    files: &FlatParameters,
) -> Result<Form, ServiceCallFailure> {
    let mut form = parameters
        .iter()
        .fold(Form::new(), |form, (key, value)| {
            form.text(key.to_owned(), value.to_owned())
        });
    for (name, path) in files.iter() {
        let contents = tokio::fs::read(path).await.map_err(|error| {
            ServiceCallFailure::without_response(TulipClientError::transport(format!(
                "failed to read upload '{name}' from '{path}': {error}"
            )))
        })?;
        let file_name = Path::new(path)
            .file_name()
            .map_or_else(|| name.to_owned(), |file| file.to_string_lossy().into_owned());
        form = form.part(name.to_owned(), Part::bytes(contents).file_name(file_name));
    }
    Ok(form)
}

fn decode_response(response: RawResponse) -> Result<ServiceResponse, ServiceCallFailure> {
    let decoded = quick_xml::de::from_str::<ResponseEnvelopeDto>(&response.body)
        .map_err(|error| error.to_string())
        .map(ResponseEnvelopeDto::into_object_id);
    match decoded {
        Ok(Ok(object_id)) => Ok(ServiceResponse {
            object_id,
            response,
        }),
        Ok(Err(error)) => Err(ServiceCallFailure::with_response(error, response)),
        Err(decode_error) => {
            let error = map_undecodable(response.status, &response.body, &decode_error);
            Err(ServiceCallFailure::with_response(error, response))
        }
    }
}

fn map_transport_error(error: &reqwest::Error) -> TulipClientError {
    if error.is_timeout() {
        TulipClientError::transport(format!("request timed out: {error}"))
    } else {
        TulipClientError::transport(error.to_string())
    }
}

fn map_undecodable(status: u16, body: &str, decode_error: &str) -> TulipClientError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {status}")
    } else {
        format!("status {status}: {body_preview}")
    };

    match StatusCode::from_u16(status) {
        Ok(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            TulipClientError::not_authorized(message)
        }
        Ok(code) if code.is_server_error() => TulipClientError::server(message),
        _ => TulipClientError::invalid_response(format!(
            "undecodable envelope ({decode_error}); {message}"
        )),
    }
}

fn body_preview(body: &str) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
