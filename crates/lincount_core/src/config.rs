//! Counter configuration

use crate::cache::{EvictionPolicy, MemoCache, DEFAULT_SHARDS};
use crate::reduce::{Reducer, SerialSum, ThreadedSum};
use tracing::warn;

/// Configuration shared by the counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountConfig {
    /// Run the top split node's outer sum on a thread pool
    pub parallel: bool,
    /// Worker threads when `parallel` is set
    pub threads: usize,
    /// Queued items per worker before the producer runs items inline
    pub queue_depth: usize,
    /// Eviction policy of every memo cache
    pub eviction: EvictionPolicy,
    /// Shards per memo cache
    pub shards: usize,
    /// Compare node answers with brute force (needs the `cross-check` feature)
    pub cross_check: bool,
}

impl Default for CountConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism().map_or(4, |n| n.get());
        Self {
            parallel: true,
            threads,
            queue_depth: 4,
            eviction: EvictionPolicy::Unbounded,
            shards: DEFAULT_SHARDS,
            cross_check: false,
        }
    }
}

impl CountConfig {
    /// Everything on the calling thread
    pub fn serial() -> Self {
        Self {
            parallel: false,
            threads: 1,
            ..Default::default()
        }
    }

    /// Top-level sum spread over `threads` workers
    pub fn parallel(threads: usize) -> Self {
        Self {
            parallel: true,
            threads: threads.max(1),
            ..Default::default()
        }
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn with_cross_check(mut self, cross_check: bool) -> Self {
        self.cross_check = cross_check;
        self
    }

    pub(crate) fn new_cache(&self) -> MemoCache {
        MemoCache::with_shards(self.eviction, self.shards)
    }

    /// Reducer for the root split node; nested nodes always sum serially
    pub(crate) fn top_reducer(&self) -> Box<dyn Reducer> {
        if self.parallel && self.threads > 1 {
            Box::new(ThreadedSum::new(self.threads).with_queue_depth(self.queue_depth))
        } else {
            Box::new(SerialSum)
        }
    }

    /// Whether answers are verified by brute force
    pub(crate) fn cross_check_enabled(&self) -> bool {
        if self.cross_check && !cfg!(feature = "cross-check") {
            warn!("cross_check requested but the `cross-check` feature is disabled; ignoring");
        }
        self.cross_check && cfg!(feature = "cross-check")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let s = CountConfig::serial();
        assert!(!s.parallel);
        assert_eq!(s.threads, 1);

        let p = CountConfig::parallel(0);
        assert!(p.parallel);
        assert_eq!(p.threads, 1);
        assert_eq!(CountConfig::parallel(6).threads, 6);

        let lru = CountConfig::serial().with_eviction(EvictionPolicy::Lru { capacity: 10 });
        assert_eq!(lru.new_cache().policy(), EvictionPolicy::Lru { capacity: 10 });
    }

    #[test]
    fn test_cross_check_needs_feature() {
        let c = CountConfig::serial().with_cross_check(true);
        assert_eq!(c.cross_check_enabled(), cfg!(feature = "cross-check"));
        assert!(!CountConfig::serial().cross_check_enabled());
    }
}
