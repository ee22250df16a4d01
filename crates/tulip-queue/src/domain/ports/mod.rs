//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod object_store;
mod tulip_client;

#[cfg(test)]
pub use object_store::MockObjectStore;
pub use object_store::{ObjectStore, ObjectStoreError};
#[cfg(test)]
pub use tulip_client::MockTulipClient;
pub use tulip_client::{
    RawResponse, ServiceCallFailure, ServiceResponse, TulipClient, TulipClientError,
};
