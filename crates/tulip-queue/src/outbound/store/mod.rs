//! Object store adapters.
//!
//! `InMemoryObjectStore` keeps committed objects in memory for callers that
//! persist elsewhere; `JsonFileObjectStore` appends committed snapshots to a
//! JSON file written atomically.

mod atomic_io;
mod json_file;
mod memory;

pub use json_file::JsonFileObjectStore;
pub use memory::InMemoryObjectStore;
