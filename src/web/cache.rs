use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Analysis responses are reused for this long before a request shape
/// triggers a fresh scan.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// One cache slot per distinct request shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: String,
    pub min_size: u64,
    pub max_depth: usize,
    pub include_hidden: bool,
}

struct CacheEntry<T> {
    payload: T,
    inserted_at: Instant,
}

/// In-memory response cache with a fixed time-to-live. Expired entries
/// are dropped lazily on lookup.
pub struct ResponseCache<T> {
    entries: DashMap<CacheKey, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<T> {
        {
            let entry = self.entries.get(key)?;
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.payload.clone());
            }
        }
        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: CacheKey, payload: T) {
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
