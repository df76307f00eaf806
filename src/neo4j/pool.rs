//! Bounded-wait access to the Neo4j connection pool.
//!
//! `neo4rs::Graph` pools Bolt connections internally but waits on an empty
//! pool without a deadline. The gate caps in-flight operations at the pool
//! size and turns a long wait into `StoreError::ConnectionUnavailable`.

use super::error::{StoreError, StoreResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Semaphore sized like the connection pool, with an acquire deadline
#[derive(Clone)]
pub struct ConnectionGate {
    slots: Arc<Semaphore>,
    capacity: usize,
    acquire_timeout: Duration,
}

/// A held slot; dropping it releases the slot, on success or error alike
pub struct ConnectionSlot {
    _permit: OwnedSemaphorePermit,
}

impl ConnectionGate {
    pub fn new(capacity: usize, acquire_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
            acquire_timeout,
        }
    }

    /// Wait for a free slot, at most `acquire_timeout`
    pub async fn acquire(&self) -> StoreResult<ConnectionSlot> {
        match tokio::time::timeout(self.acquire_timeout, self.slots.clone().acquire_owned()).await
        {
            Ok(Ok(permit)) => Ok(ConnectionSlot { _permit: permit }),
            // Closed semaphore: the gate is never closed, treat like exhaustion
            Ok(Err(_)) | Err(_) => {
                tracing::warn!(
                    "No connection slot free after {:?} ({} in use)",
                    self.acquire_timeout,
                    self.in_use()
                );
                Err(StoreError::ConnectionUnavailable {
                    waited: self.acquire_timeout,
                })
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held
    pub fn in_use(&self) -> usize {
        self.capacity - self.slots.available_permits()
    }
}
