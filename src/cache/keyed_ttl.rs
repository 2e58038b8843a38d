//! Per-identifier cache with an absolute time-to-live.
//!
//! Staleness is detected lazily when an entry is read; nothing sweeps the
//! map in the background.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::api::RemoteResponse;
use crate::utils::{Clock, Result};

/// Remote fetch backing a [`KeyedTtlCache`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyedSource<T: Send + Sync + 'static>: Send + Sync {
    async fn load(&self, id: &str) -> RemoteResponse<T>;
}

#[derive(Debug, Clone)]
struct TtlEntry<T> {
    value: T,
    stored_at_ms: u64,
}

impl<T> TtlEntry<T> {
    fn is_fresh(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at_ms) < ttl_ms
    }
}

struct Entries<T> {
    map: HashMap<String, TtlEntry<T>>,
    // Per-id counters bumped by `invalidate(id)`, plus one epoch bumped by
    // `invalidate_all`. An in-flight fetch stores its value only if neither
    // moved while it ran, so invalidating one id never drops another's write.
    generations: HashMap<String, u64>,
    epoch: u64,
}

impl<T> Entries<T> {
    fn stamp(&self, id: &str) -> (u64, u64) {
        (self.epoch, self.generations.get(id).copied().unwrap_or(0))
    }
}

/// Keyed cache with lazy TTL validation
pub struct KeyedTtlCache<T> {
    name: &'static str,
    source: Arc<dyn KeyedSource<T>>,
    clock: Arc<dyn Clock>,
    ttl_ms: u64,
    entries: Mutex<Entries<T>>,
}

impl<T> fmt::Debug for KeyedTtlCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedTtlCache")
            .field("name", &self.name)
            .field("ttl_ms", &self.ttl_ms)
            .field("entries", &self.entries.lock().map.len())
            .finish()
    }
}

impl<T> KeyedTtlCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        name: &'static str,
        source: Arc<dyn KeyedSource<T>>,
        clock: Arc<dyn Clock>,
        ttl_ms: u64,
    ) -> Self {
        Self {
            name,
            source,
            clock,
            ttl_ms,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                generations: HashMap::new(),
                epoch: 0,
            }),
        }
    }

    /// Fresh cached value for `id`, or one remote fetch
    ///
    /// A failed fetch leaves any existing (stale) entry untouched.
    pub async fn fetch(&self, id: &str) -> Result<T> {
        let stamp = {
            let entries = self.entries.lock();
            if let Some(entry) = entries.map.get(id) {
                if entry.is_fresh(self.clock.now_millis(), self.ttl_ms) {
                    trace!(cache = self.name, id, "Cache hit");
                    return Ok(entry.value.clone());
                }
                debug!(cache = self.name, id, "Cached entry expired");
            }
            entries.stamp(id)
        };

        debug!(cache = self.name, id, "Cache miss, fetching from remote");
        let value = match self.source.load(id).await.into_result() {
            Ok(value) => value,
            Err(e) => {
                debug!(cache = self.name, id, error = %e, "Remote fetch failed");
                return Err(e);
            }
        };

        let mut entries = self.entries.lock();
        if entries.stamp(id) == stamp {
            entries.map.insert(
                id.to_string(),
                TtlEntry {
                    value: value.clone(),
                    stored_at_ms: self.clock.now_millis(),
                },
            );
        } else {
            debug!(cache = self.name, id, "Invalidated while fetching, not caching");
        }

        Ok(value)
    }

    /// Cached value for `id` only while it is within the TTL
    ///
    /// Never fetches, never refreshes the timestamp, never removes.
    pub fn peek(&self, id: &str) -> Option<T> {
        let now = self.clock.now_millis();
        self.entries
            .lock()
            .map
            .get(id)
            .filter(|entry| entry.is_fresh(now, self.ttl_ms))
            .map(|entry| entry.value.clone())
    }

    /// Remove the entry for one identifier
    pub fn invalidate(&self, id: &str) {
        let mut entries = self.entries.lock();
        entries.map.remove(id);
        *entries.generations.entry(id.to_string()).or_insert(0) += 1;
        debug!(cache = self.name, id, "Entry invalidated");
    }

    /// Remove every entry
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.lock();
        let removed = entries.map.len();
        entries.map.clear();
        // the epoch alone rejects every fetch started before this point
        entries.generations.clear();
        entries.epoch += 1;
        debug!(cache = self.name, removed, "Cache cleared");
    }

    /// Stored entries, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }
}
