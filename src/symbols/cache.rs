//! Bounded memo of resolved symbols, keyed by numeric address.

use super::resolver::SymbolInfo;
use lru::LruCache;
use std::num::NonZeroUsize;

/// LRU cache of resolved addresses with hit/miss accounting
pub struct SymbolCache {
    entries: LruCache<u64, SymbolInfo>,
    hits: u64,
    misses: u64,
}

impl SymbolCache {
    /// Create a cache holding at most `capacity` addresses (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up `addr`, counting the hit or miss
    pub fn get(&mut self, addr: u64) -> Option<SymbolInfo> {
        match self.entries.get(&addr) {
            Some(info) => {
                self.hits += 1;
                Some(info.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert a resolved address, evicting the least recently used on overflow
    pub fn insert(&mut self, addr: u64, info: SymbolInfo) {
        self.entries.put(addr, info);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// One-line statistics for logging
    pub fn summary(&self) -> String {
        format!(
            "{} hits, {} misses, {}/{} entries",
            self.hits,
            self.misses,
            self.len(),
            self.capacity()
        )
    }
}
