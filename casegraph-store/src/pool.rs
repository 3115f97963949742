//! Bounded connection pool with scoped acquisition
//!
//! A [`StoreConn`] guard represents one acquired connection. The permit is
//! released when the guard drops, so a connection is returned on every exit
//! path and never held across logical requests.

use crate::error::{Result, StoreError};
use crate::store::GraphStore;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounded pool over a shared store
#[derive(Debug)]
pub struct StorePool<S> {
    store: Arc<S>,
    permits: Arc<Semaphore>,
    size: usize,
}

impl<S: GraphStore> StorePool<S> {
    /// Create a pool with `size` concurrent connections
    pub fn new(store: impl Into<Arc<S>>, size: usize) -> Self {
        let size = size.max(1);
        Self {
            store: store.into(),
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Acquire a connection, waiting for a free slot
    pub async fn acquire(&self) -> Result<StoreConn<S>> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| StoreError::Connection("pool closed".into()))?;
        Ok(StoreConn {
            store: Arc::clone(&self.store),
            _permit: permit,
        })
    }

    /// The shared store handle (used by the mapper for metadata lookups)
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Currently free connection slots
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// A scoped connection; the slot is released on drop
pub struct StoreConn<S> {
    store: Arc<S>,
    _permit: OwnedSemaphorePermit,
}

impl<S: GraphStore> StoreConn<S> {
    pub fn store(&self) -> &S {
        &self.store
    }
}
