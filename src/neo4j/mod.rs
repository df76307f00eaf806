//! Neo4j client and models for the soiree graph

pub mod client;
pub mod error;
mod impl_graph_store;
pub mod instrumented;
pub mod models;
pub mod pool;
pub mod traits;

pub use client::Neo4jClient;
pub use error::{StoreError, StoreResult};
pub use instrumented::InstrumentedStore;
pub use models::*;
pub use traits::GraphStore;

#[cfg(test)]
pub(crate) mod mock;
