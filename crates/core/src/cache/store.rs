//! In-memory read-through cache with TTL expiry, a byte ceiling, and
//! LRU eviction.
//!
//! Entries carry an estimated size and a last-access timestamp. A `get`
//! refreshes the timestamp, so eviction under the byte ceiling removes the
//! least recently used entry. A background task sweeps out expired entries
//! that are never read again.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use schemars::JsonSchema;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Fixed per-entry bookkeeping cost added to every size estimate.
const ENTRY_OVERHEAD: usize = 24;

/// Value-size estimate used when a payload refuses to serialize.
const FALLBACK_VALUE_LEN: usize = 1024;

/// Construction-time cache settings.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// TTL applied when `set` is called without one.
    pub default_ttl: Duration,
    /// Ceiling on the summed estimated size of all entries.
    pub max_bytes: usize,
    /// Interval between background sweeps of expired entries.
    pub sweep_interval: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            max_bytes: 100 * 1024 * 1024,
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Point-in-time cache counters, as reported by the `cache_stats` tool.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CacheStats {
    /// Number of entries currently held, including not-yet-swept expired ones.
    pub size: usize,
    /// Summed estimated size of all entries in bytes.
    pub memory_usage: usize,
    /// Hit-rate tracking is not implemented; always zero.
    pub hit_rate: f64,
}

struct CacheEntry {
    value: Box<dyn Any + Send + Sync>,
    estimated_size: usize,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

struct Shared {
    entries: HashMap<String, CacheEntry>,
    default_ttl: Duration,
    max_bytes: usize,
}

impl Shared {
    fn memory_usage(&self) -> usize {
        self.entries.values().map(|e| e.estimated_size).sum()
    }

    /// Remove the entry with the oldest `stored_at`. Ties go to whichever
    /// entry the map yields first.
    fn evict_oldest(&mut self) -> Option<String> {
        let key = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored_at)
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&key);
        Some(key)
    }

    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }
}

/// Heterogeneous key/value cache shared by all request handlers.
///
/// Payloads are stored as `Box<dyn Any>`; each call site reads back its own
/// concrete type. Serialization is used only to estimate entry sizes for the
/// byte ceiling, never for storage.
///
/// All operations take the internal lock for their full duration and never
/// hold it across an await, so check-then-evict and check-then-expire are
/// atomic with respect to each other and to the sweep task.
pub struct MemoryCache {
    shared: Arc<Mutex<Shared>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryCache {
    /// Create a cache and spawn its background sweep task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(options: CacheOptions) -> Self {
        let shared = Arc::new(Mutex::new(Shared {
            entries: HashMap::new(),
            default_ttl: options.default_ttl,
            max_bytes: options.max_bytes,
        }));
        let sweeper = spawn_sweeper(Arc::downgrade(&shared), options.sweep_interval);
        Self { shared, sweeper: Mutex::new(Some(sweeper)) }
    }

    /// Create a cache with the default TTL, ceiling, and sweep interval.
    pub fn with_defaults() -> Self {
        Self::new(CacheOptions::default())
    }

    /// Store `value` under `key` with the given TTL (or the default).
    ///
    /// Evicts least-recently-used entries until the post-insert size estimate
    /// fits the ceiling or the cache is empty. A single entry larger than the
    /// ceiling is still stored. Never fails: a payload that cannot be
    /// serialized falls back to a fixed size estimate.
    pub fn set<T>(&self, key: &str, value: T, ttl: Option<Duration>)
    where
        T: Serialize + Send + Sync + 'static,
    {
        let serialized_len = match serde_json::to_string(&value) {
            Ok(json) => json.len(),
            Err(err) => {
                tracing::debug!(key, %err, "falling back to fixed size estimate");
                FALLBACK_VALUE_LEN
            }
        };
        let estimated_size = 2 * key.len() + 2 * serialized_len + ENTRY_OVERHEAD;

        let mut shared = lock(&self.shared);
        let ttl = ttl.unwrap_or(shared.default_ttl);

        // The entry being replaced must not count against the ceiling.
        shared.entries.remove(key);
        while !shared.entries.is_empty()
            && shared.memory_usage() + estimated_size > shared.max_bytes
        {
            if let Some(evicted) = shared.evict_oldest() {
                tracing::debug!(key = %evicted, "evicted least recently used entry");
            }
        }

        shared.entries.insert(
            key.to_string(),
            CacheEntry {
                value: Box::new(value),
                estimated_size,
                stored_at: Instant::now(),
                ttl,
            },
        );
        tracing::debug!(key, ttl_ms = ttl.as_millis() as u64, "cache set");
    }

    /// Return the value under `key` if present and unexpired.
    ///
    /// A hit refreshes the entry's recency; an expired entry is deleted. A
    /// type mismatch between the stored payload and `T` reads as a miss.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut shared = lock(&self.shared);
        let now = Instant::now();

        let expired = match shared.entries.get(key) {
            None => {
                tracing::trace!(key, "cache miss");
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            shared.entries.remove(key);
            tracing::debug!(key, "cache entry expired");
            return None;
        }

        let entry = shared.entries.get_mut(key)?;
        entry.stored_at = now;
        let value = entry.value.downcast_ref::<T>().cloned();
        if value.is_none() {
            tracing::warn!(key, "cache entry holds a different payload type");
        } else {
            tracing::trace!(key, "cache hit");
        }
        value
    }

    /// Whether `key` holds an unexpired entry.
    ///
    /// Does not refresh recency. An expired entry found here is deleted.
    pub fn has(&self, key: &str) -> bool {
        let mut shared = lock(&self.shared);
        let now = Instant::now();
        let expired = match shared.entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            shared.entries.remove(key);
            return false;
        }
        true
    }

    /// Remove the entry under `key`, reporting whether one was present.
    pub fn delete(&self, key: &str) -> bool {
        let removed = lock(&self.shared).entries.remove(key).is_some();
        if removed {
            tracing::debug!(key, "cache entry deleted");
        }
        removed
    }

    /// Remove all entries unconditionally.
    pub fn clear(&self) {
        lock(&self.shared).entries.clear();
        tracing::info!("cache cleared");
    }

    /// Number of entries held, including not-yet-swept expired ones.
    pub fn size(&self) -> usize {
        lock(&self.shared).entries.len()
    }

    /// Current counters. `memory_usage` is an estimate, not an exact figure.
    pub fn stats(&self) -> CacheStats {
        let shared = lock(&self.shared);
        CacheStats {
            size: shared.entries.len(),
            memory_usage: shared.memory_usage(),
            hit_rate: 0.0,
        }
    }

    /// Delete every entry whose age exceeds its TTL, returning the count.
    ///
    /// The background task calls this on its interval; exposed for callers
    /// that want an immediate pass.
    pub fn sweep(&self) -> usize {
        lock(&self.shared).sweep(Instant::now())
    }

    /// Cancel the background sweep and drop all entries.
    ///
    /// Safe to call once during shutdown; subsequent calls are no-ops apart
    /// from re-clearing an already empty map.
    pub fn destroy(&self) {
        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        lock(&self.shared).entries.clear();
        tracing::info!("cache destroyed");
    }
}

impl Drop for MemoryCache {
    fn drop(&mut self) {
        let handle = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = lock(&self.shared);
        f.debug_struct("MemoryCache")
            .field("size", &shared.entries.len())
            .field("max_bytes", &shared.max_bytes)
            .field("default_ttl", &shared.default_ttl)
            .finish()
    }
}

// A poisoned lock only means a writer panicked mid-operation; the map is
// still structurally sound, so the guard is recovered rather than propagated.
fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn spawn_sweeper(shared: Weak<Mutex<Shared>>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(shared) = shared.upgrade() else {
                break;
            };
            let removed = lock(&shared).sweep(Instant::now());
            if removed > 0 {
                tracing::debug!(removed, "sweep removed expired entries");
            }
        }
    })
}
