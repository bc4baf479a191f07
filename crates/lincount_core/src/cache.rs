//! Concurrent memoization of counts
//!
//! [`MemoCache::get_or_compute`] guarantees that the compute function runs at
//! most once per key while the key is resident, even under concurrent access.
//!
//! # Design
//!
//! - Keys are sharded by their precomputed hash across independently locked
//!   buckets to bound contention.
//! - A miss installs a per-key placeholder (`Arc<OnceLock<Count>>`) under the
//!   bucket lock, releases the lock, then fills the placeholder. A second
//!   caller for the same key finds the placeholder and blocks on it instead
//!   of recomputing.
//! - The compute function must not request its own key. Requesting other
//!   keys, in any shard, is fine since no bucket lock is held while computing.
//! - Eviction only ever removes filled entries, never in-flight ones. Each
//!   shard keeps its entries ordered by stamp, so the victim is found from
//!   the oldest end instead of by scanning the shard.
//! - `len` and `clear` are best effort: they visit shards one at a time.

use crate::intvec::IntVec;
use num_bigint::BigUint;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::trace;

/// Default number of shards
pub const DEFAULT_SHARDS: usize = 64;

/// What to drop when a shard is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Keep everything
    #[default]
    Unbounded,
    /// Evict the least recently accessed entry once `capacity` is reached
    Lru { capacity: usize },
    /// Evict the oldest inserted entry once `capacity` is reached
    Fifo { capacity: usize },
}

impl EvictionPolicy {
    fn capacity(self) -> Option<usize> {
        match self {
            EvictionPolicy::Unbounded => None,
            EvictionPolicy::Lru { capacity } | EvictionPolicy::Fifo { capacity } => Some(capacity),
        }
    }
}

/// Snapshot of cache activity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered by an existing (possibly in-flight) entry
    pub hits: u64,
    /// Invocations of a compute function
    pub computes: u64,
    /// Entries dropped by the eviction policy
    pub evictions: u64,
}

impl std::ops::Add for CacheStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            computes: self.computes + other.computes,
            evictions: self.evictions + other.evictions,
        }
    }
}

struct Entry {
    slot: Arc<OnceLock<BigUint>>,
    /// insertion tick (FIFO) or last access tick (LRU)
    stamp: u64,
}

/// One locked bucket. `order` maps every entry's stamp back to its key;
/// stamps come from a shared clock and are unique.
#[derive(Default)]
struct Shard {
    map: FxHashMap<IntVec, Entry>,
    order: BTreeMap<u64, IntVec>,
}

impl Shard {
    fn len(&self) -> usize {
        self.map.len()
    }

    fn insert(&mut self, key: IntVec, entry: Entry) {
        self.order.insert(entry.stamp, key.clone());
        if let Some(old) = self.map.insert(key, entry) {
            self.order.remove(&old.stamp);
        }
    }

    /// Oldest filled entry, skipping in-flight ones
    fn pop_oldest_filled(&mut self) -> Option<IntVec> {
        let stamp = self
            .order
            .iter()
            .find(|(_, k)| self.map.get(*k).is_some_and(|e| e.slot.get().is_some()))
            .map(|(&stamp, _)| stamp)?;
        let key = self.order.remove(&stamp)?;
        self.map.remove(&key);
        Some(key)
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

/// Sharded, concurrent `IntVec -> BigUint` memo table
pub struct MemoCache {
    shards: Box<[Mutex<Shard>]>,
    policy: EvictionPolicy,
    shard_capacity: Option<usize>,
    clock: AtomicU64,
    hits: AtomicU64,
    computes: AtomicU64,
    evictions: AtomicU64,
}

impl MemoCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self::with_shards(policy, DEFAULT_SHARDS)
    }

    pub fn with_shards(policy: EvictionPolicy, shards: usize) -> Self {
        let shards = shards.max(1);
        let shard_capacity = policy.capacity().map(|c| c.div_ceil(shards).max(1));
        Self {
            shards: (0..shards).map(|_| Mutex::new(Shard::default())).collect(),
            policy,
            shard_capacity,
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            computes: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn shard(&self, key: &IntVec) -> MutexGuard<'_, Shard> {
        let idx = (key.hash_code() % self.shards.len() as u64) as usize;
        lock(&self.shards[idx])
    }

    /// Return the cached count for `key`, computing it with `f` if absent.
    pub fn get_or_compute<F>(&self, key: IntVec, f: F) -> BigUint
    where
        F: FnOnce() -> BigUint,
    {
        let slot = {
            let mut shard = self.shard(&key);
            let tick = self.clock.fetch_add(1, Ordering::Relaxed);
            let Shard { map, order } = &mut *shard;
            match map.get_mut(&key) {
                Some(entry) => {
                    if matches!(self.policy, EvictionPolicy::Lru { .. }) {
                        if let Some(k) = order.remove(&entry.stamp) {
                            order.insert(tick, k);
                        }
                        entry.stamp = tick;
                    }
                    Arc::clone(&entry.slot)
                }
                None => {
                    if let Some(cap) = self.shard_capacity {
                        if shard.len() >= cap {
                            self.evict_one(&mut shard);
                        }
                    }
                    let slot = Arc::new(OnceLock::new());
                    shard.insert(
                        key,
                        Entry {
                            slot: Arc::clone(&slot),
                            stamp: tick,
                        },
                    );
                    slot
                }
            }
        };

        let mut computed = false;
        let value = slot.get_or_init(|| {
            computed = true;
            f()
        });
        if computed {
            self.computes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        value.clone()
    }

    /// Cached value for `key`, if present and finished
    pub fn get(&self, key: &IntVec) -> Option<BigUint> {
        self.shard(key).map.get(key).and_then(|e| e.slot.get().cloned())
    }

    fn evict_one(&self, shard: &mut Shard) {
        if let Some(key) = shard.pop_oldest_filled() {
            trace!(key = %key, "evicting cached count");
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of entries (best effort)
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| lock(s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries (best effort, not atomic across shards)
    pub fn clear(&self) {
        for s in self.shards.iter() {
            lock(s).clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            computes: self.computes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new(EvictionPolicy::Unbounded)
    }
}

impl std::fmt::Debug for MemoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache")
            .field("shards", &self.shards.len())
            .field("policy", &self.policy)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Lock a mutex, ignoring poisoning: a panicking compute function leaves its
/// placeholder empty, never a half-written map.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
