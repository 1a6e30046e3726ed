//! Compiled-selector cache keyed by exact selector text.
//!
//! Entries are immutable [`CompiledSelector`]s behind an [`Arc`], so readers
//! share them freely. Insertion takes the write lock and is idempotent: if two
//! callers compile the same text concurrently, the first entry inserted wins
//! and both get it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use koala_common::warning::warn_once;

use crate::error::SyntaxError;
use crate::parser;
use crate::selector::CompiledSelector;

/// Counters describing cache behaviour since creation (or the last [`SelectorCache::clear`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compile.
    pub misses: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
    /// Entries currently held.
    pub len: usize,
}

#[derive(Debug, Default)]
struct Entries {
    by_text: HashMap<String, Arc<CompiledSelector>>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
}

/// A bounded (or unbounded) first-in, first-out map from selector text to
/// compiled selector.
#[derive(Debug)]
pub struct SelectorCache {
    capacity: Option<usize>,
    entries: RwLock<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl SelectorCache {
    /// Create a cache holding at most `capacity` entries; `None` never evicts.
    /// A capacity of zero compiles every time and stores nothing.
    #[must_use]
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            entries: RwLock::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// The configured bound.
    #[must_use]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Return the compiled form of `text`, compiling and storing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the [`SyntaxError`] if `text` does not compile. Failures are
    /// not cached.
    pub fn get_or_compile(&self, text: &str) -> Result<Arc<CompiledSelector>, SyntaxError> {
        if let Some(hit) = self.read().by_text.get(text).cloned() {
            let _ = self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!(target: "koala::selectors", "cache hit for {text:?}");
            return Ok(hit);
        }

        let _ = self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!(target: "koala::selectors", "compiling selector {text:?}");
        let compiled = Arc::new(parser::compile(text).inspect_err(|error| {
            log::debug!(target: "koala::selectors", "selector {text:?} rejected: {error}");
        })?);

        if self.capacity == Some(0) {
            return Ok(compiled);
        }

        let mut entries = self.write();
        if let Some(existing) = entries.by_text.get(text) {
            return Ok(Arc::clone(existing));
        }

        if let Some(capacity) = self.capacity {
            while entries.by_text.len() >= capacity {
                let Some(oldest) = entries.order.pop_front() else {
                    break;
                };
                let _ = entries.by_text.remove(&oldest);
                let _ = self.evictions.fetch_add(1, Ordering::Relaxed);
                log::trace!(target: "koala::selectors", "evicted {oldest:?}");
                warn_once(
                    "Selectors",
                    &format!("selector cache full at {capacity} entries, evicting oldest"),
                );
            }
        }

        entries.order.push_back(text.to_string());
        let _ = entries
            .by_text
            .insert(text.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Look up `text` without compiling or touching the counters.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Arc<CompiledSelector>> {
        self.read().by_text.get(text).cloned()
    }

    /// Whether `text` is cached.
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.read().by_text.contains_key(text)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().by_text.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().by_text.is_empty()
    }

    /// Drop every entry and reset the counters.
    ///
    /// Selectors already handed out stay valid; they are reference counted.
    pub fn clear(&self) {
        let mut entries = self.write();
        entries.by_text.clear();
        entries.order.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        log::debug!(target: "koala::selectors", "selector cache cleared");
    }

    /// A snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::new(Some(crate::engine::DEFAULT_CACHE_CAPACITY))
    }
}
