//! Domain model for queueing objects and dispatching them to Tulip.
//!
//! Purpose: hold the queue, the object capability traits, the parameter
//! flattening rule and the service/action registry. Transport and
//! persistence stay behind the traits in [`ports`].
//!
//! Public surface:
//! - `QueueManager`: queue, dispatch loop and results log.
//! - `TulipObject` / `TulipUploadObject` / `QueuedObject`: what can be queued.
//! - `flatten_parameters` / `FlatParameters`: form-safe parameters.
//! - `ObjectsMap` / `ServiceAction`: type to service/action resolution.
//! - `TulipRecord`: JSON-described object for callers without their own types.

mod object;
mod objects_map;
mod parameters;
pub mod ports;
mod queue_manager;
mod record;

pub use self::object::{
    ObjectPoisoned, ObjectSnapshot, QueuedObject, SharedTulipObject, SharedTulipUploadObject,
    TulipObject, TulipUploadObject,
};
pub use self::objects_map::{DEFAULT_ACTION, ObjectsMap, ObjectsMapError, ServiceAction};
pub use self::parameters::{FlatParameters, Parameters, flatten_parameters};
pub use self::queue_manager::{DispatchResult, DispatchSummary, QueueError, QueueManager};
pub use self::record::{RecordError, TulipRecord};
