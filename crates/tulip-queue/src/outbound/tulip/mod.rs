//! Tulip API outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `TulipClient` port.

mod dto;
mod http_client;

pub use http_client::{TulipHttpClient, TulipHttpIdentity};
