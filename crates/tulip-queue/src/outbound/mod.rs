//! Outbound adapters for the domain ports.
//!
//! - `tulip`: reqwest-backed `TulipClient`.
//! - `store`: in-memory and JSON file `ObjectStore` implementations.

pub mod store;
pub mod tulip;
