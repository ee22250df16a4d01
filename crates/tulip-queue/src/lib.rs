//! Batched dispatch of queued domain objects to the Tulip API.
//!
//! Objects are queued, flattened into form parameters, sent one call per
//! object, and staged for persistence once Tulip assigned them an id.
//! Failures are captured per object with the original response and never
//! abort the batch.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tulip_queue::domain::{QueueManager, TulipRecord};
//! use tulip_queue::outbound::store::InMemoryObjectStore;
//! use tulip_queue::outbound::tulip::TulipHttpClient;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TulipHttpClient::new("https://tulip.example.com", Duration::from_secs(30))?;
//! let mut manager = QueueManager::new(Arc::new(client));
//! manager.enqueue(TulipRecord::new("Contact").with_parameter("name", "Ada").into_queued());
//!
//! let store = InMemoryObjectStore::default();
//! manager.dispatch(&store).await?;
//! for failure in manager.results() {
//!     eprintln!("{}: {}", failure.url, failure.failure);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod outbound;
