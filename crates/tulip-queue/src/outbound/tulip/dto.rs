//! DTOs for decoding the Tulip XML response envelope.
//!
//! ```xml
//! <response code="1000">
//!   <result offset="0" limit="0" total="1">
//!     <object><id>42</id></object>
//!   </result>
//! </response>
//! ```

use serde::Deserialize;

use crate::domain::ports::TulipClientError;

pub(super) const SUCCESS_CODE: u32 = 1000;
pub(super) const NOT_AUTHORIZED_CODE: u32 = 1001;

#[derive(Debug, Deserialize)]
pub(super) struct ResponseEnvelopeDto {
    #[serde(rename = "@code")]
    pub(super) code: u32,
    #[serde(default)]
    pub(super) error: Option<String>,
    #[serde(default)]
    pub(super) result: Option<ResultDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResultDto {
    #[serde(default)]
    pub(super) object: Vec<ObjectDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ObjectDto {
    #[serde(default)]
    pub(super) id: Option<String>,
}

impl ResponseEnvelopeDto {
    pub(super) fn into_object_id(self) -> Result<String, TulipClientError> {
        let message = self
            .error
            .map(|error| error.trim().to_owned())
            .unwrap_or_default();
        match self.code {
            SUCCESS_CODE => self
                .result
                .and_then(|result| result.object.into_iter().next())
                .and_then(|object| object.id)
                .map(|id| id.trim().to_owned())
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    TulipClientError::invalid_response("success envelope carried no object id")
                }),
            NOT_AUTHORIZED_CODE => Err(TulipClientError::not_authorized(message)),
            code => Err(TulipClientError::rejected(code, message)),
        }
    }
}
