//! Single-slot response cache.
//!
//! Holds the last successful fetch of one resource collection until it is
//! invalidated. There is no TTL and no negative caching.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::api::RemoteResponse;
use crate::utils::Result;

/// Remote fetch backing a [`ResourceCache`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceSource<T: Send + Sync + 'static>: Send + Sync {
    async fn load(&self) -> RemoteResponse<T>;
}

struct Slot<T> {
    value: Option<T>,
    // Bumped on invalidate; a fetch that started under an older generation
    // returns its value to the caller but does not store it.
    generation: u64,
}

/// Cache one collection, invalidate on demand
pub struct ResourceCache<T> {
    name: &'static str,
    source: Arc<dyn ResourceSource<T>>,
    slot: RwLock<Slot<T>>,
}

impl<T> fmt::Debug for ResourceCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read();
        f.debug_struct("ResourceCache")
            .field("name", &self.name)
            .field("warm", &slot.value.is_some())
            .field("generation", &slot.generation)
            .finish()
    }
}

impl<T> ResourceCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, source: Arc<dyn ResourceSource<T>>) -> Self {
        Self {
            name,
            source,
            slot: RwLock::new(Slot {
                value: None,
                generation: 0,
            }),
        }
    }

    /// Cached value, or one remote fetch when the slot is empty
    pub async fn fetch(&self) -> Result<T> {
        let generation = {
            let slot = self.slot.read();
            if let Some(value) = &slot.value {
                trace!(cache = self.name, "Cache hit");
                return Ok(value.clone());
            }
            slot.generation
        };

        debug!(cache = self.name, "Cache miss, fetching from remote");
        let value = match self.source.load().await.into_result() {
            Ok(value) => value,
            Err(e) => {
                debug!(cache = self.name, error = %e, "Remote fetch failed");
                return Err(e);
            }
        };

        let mut slot = self.slot.write();
        if slot.generation == generation {
            slot.value = Some(value.clone());
            debug!(cache = self.name, "Cached fresh value");
        } else {
            debug!(cache = self.name, "Invalidated while fetching, not caching");
        }

        Ok(value)
    }

    /// Cached value without touching the network
    pub fn peek(&self) -> Option<T> {
        self.slot.read().value.clone()
    }

    /// Drop the cached value; the next fetch goes to the network
    pub fn invalidate(&self) {
        let mut slot = self.slot.write();
        slot.value = None;
        slot.generation += 1;
        debug!(cache = self.name, "Cache invalidated");
    }

    pub fn is_warm(&self) -> bool {
        self.slot.read().value.is_some()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
