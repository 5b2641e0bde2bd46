//! In-memory key/value store with per-entry TTL and an optional size limit.
//!
//! Entries go stale `ttl` after they were last *touched*, where both `set`
//! and a successful `get` count as a touch. Stale entries are hidden from
//! `get` but stay in the map, and still occupy a slot, until they are
//! overwritten or evicted. When a limit is configured, each `set` that
//! pushes the size past it evicts the single least-recently-touched entry.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of "now" for expiry checks.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    last_accessed_at: Instant,
    /// Monotonic touch counter; orders entries touched within the same instant.
    touch_seq: u64,
    /// `None` never expires.
    ttl: Option<Duration>,
}

impl<V> CacheEntry<V> {
    fn is_alive(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(self.last_accessed_at) <= ttl,
            None => true,
        }
    }
}

#[derive(Debug)]
pub struct ExpiringCache<K, V, C = SystemClock> {
    entries: HashMap<K, CacheEntry<V>>,
    limit: Option<usize>,
    clock: C,
    next_touch: u64,
}

impl<K: Eq + Hash + Clone, V> ExpiringCache<K, V, SystemClock> {
    /// Unbounded cache on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock, None)
    }

    /// Cache holding at most `limit` entries, on the system clock.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self::with_clock(SystemClock, Some(limit))
    }
}

impl<K: Eq + Hash + Clone, V> Default for ExpiringCache<K, V, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, V, C: Clock> ExpiringCache<K, V, C> {
    #[must_use]
    pub fn with_clock(clock: C, limit: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            limit,
            clock,
            next_touch: 0,
        }
    }

    /// Store `value` with no expiry.
    pub fn set(&mut self, key: K, value: V) {
        self.insert(key, value, None);
    }

    /// Store `value`, letting it go stale `ttl` after its last touch.
    pub fn set_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        self.insert(key, value, Some(ttl));
    }

    /// Look up `key`, refreshing its last-touched time on a hit.
    ///
    /// Stale entries read as `None` but are left in place.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let touch_seq = self.next_touch;
        let entry = self.entries.get_mut(key)?;
        if !entry.is_alive(now) {
            return None;
        }

        entry.last_accessed_at = now;
        entry.touch_seq = touch_seq;
        self.next_touch += 1;
        Some(&entry.value)
    }

    /// Stored entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn insert(&mut self, key: K, value: V, ttl: Option<Duration>) {
        let entry = CacheEntry {
            value,
            last_accessed_at: self.clock.now(),
            touch_seq: self.next_touch,
            ttl,
        };
        self.next_touch += 1;
        self.entries.insert(key, entry);

        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                self.evict_oldest();
            }
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.last_accessed_at, entry.touch_seq))
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
            tracing::debug!(size = self.entries.len(), "evicted least recently used cache entry");
        }
    }
}
