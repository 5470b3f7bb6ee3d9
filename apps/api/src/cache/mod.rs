//! Bounded TTL cache for memoizing expensive results (resume parsing).
//!
//! Entries expire `ttl` after they were written. When a new key would push the
//! cache past `max_items`, exactly one entry is evicted first: the one written
//! longest ago. Reads never refresh an entry, so this is eviction by write
//! time, not LRU.
//!
//! Built once at startup and shared through `AppState` as `Arc<TtlCache<_>>`.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct CacheEntry<V> {
    inserted_at: Instant,
    value: V,
}

pub struct TtlCache<V> {
    ttl: Duration,
    max_items: usize,
    // Capacity check, eviction and insert all happen under this one lock.
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_items: usize) -> Self {
        Self {
            ttl,
            max_items,
            entries: Mutex::new(HashMap::with_capacity(max_items)),
        }
    }

    /// Returns the value for `key` if present and not expired.
    /// An expired entry is dropped on the way out.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => now.saturating_duration_since(entry.inserted_at) > self.ttl,
        };

        if expired {
            entries.remove(key);
            debug!(key, "cache entry expired");
            return None;
        }

        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key`, overwriting any previous value and
    /// restarting its TTL. A capacity of zero disables caching.
    pub fn set(&self, key: impl Into<String>, value: V) {
        if self.max_items == 0 {
            return;
        }

        let key = key.into();
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if !entries.contains_key(&key) && entries.len() >= self.max_items {
            if let Some(oldest) = oldest_key(&entries) {
                entries.remove(&oldest);
                debug!(evicted = %oldest, "cache at capacity, evicted oldest entry");
            }
        }

        entries.insert(
            key,
            CacheEntry {
                inserted_at: now,
                value,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }
}

/// Oldest write wins; equal timestamps fall back to the smallest key so the
/// choice is reproducible.
fn oldest_key<V>(entries: &HashMap<String, CacheEntry<V>>) -> Option<String> {
    entries
        .iter()
        .min_by(|(ka, a), (kb, b)| a.inserted_at.cmp(&b.inserted_at).then_with(|| ka.cmp(kb)))
        .map(|(key, _)| key.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::advance;

    fn cache(ttl_secs: u64, max_items: usize) -> TtlCache<i32> {
        TtlCache::new(Duration::from_secs(ttl_secs), max_items)
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_missing_key_is_none() {
        let c = cache(60, 4);
        assert_eq!(c.get("nope"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_then_get() {
        let c = cache(60, 4);
        c.set("a", 1);
        assert_eq!(c.get("a"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_alive_at_exact_ttl() {
        let c = cache(10, 4);
        c.set("a", 1);
        advance(Duration::from_secs(10)).await;
        assert_eq!(c.get("a"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_removed_on_read() {
        let c = cache(10, 4);
        c.set("a", 1);
        c.set("b", 2);
        advance(Duration::from_millis(10_001)).await;

        assert_eq!(c.get("a"), None);
        assert_eq!(c.len(), 1, "expired entry should be dropped by the read");
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicts_oldest_write() {
        // max_items=2: a@t0, b@t1, c@t2 -> a evicted
        let c = cache(60, 2);
        c.set("a", 1);
        advance(Duration::from_secs(1)).await;
        c.set("b", 2);
        advance(Duration::from_secs(1)).await;
        c.set("c", 3);

        assert_eq!(c.get("a"), None);
        assert_eq!(c.get("b"), Some(2));
        assert_eq!(c.get("c"), Some(3));
        assert_eq!(c.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_do_not_refresh_recency() {
        let c = cache(60, 2);
        c.set("a", 1);
        advance(Duration::from_secs(1)).await;
        c.set("b", 2);
        advance(Duration::from_secs(1)).await;

        // Not LRU: touching "a" must not save it.
        assert_eq!(c.get("a"), Some(1));
        c.set("c", 3);

        assert_eq!(c.get("a"), None);
        assert_eq!(c.get("b"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_refreshes_timestamp_without_growth() {
        let c = cache(60, 2);
        c.set("a", 1);
        advance(Duration::from_secs(1)).await;
        c.set("b", 2);
        advance(Duration::from_secs(1)).await;

        c.set("a", 10);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("a"), Some(10));
        assert_eq!(c.get("b"), Some(2));

        // "b" is now the oldest write.
        advance(Duration::from_secs(1)).await;
        c.set("c", 3);
        assert_eq!(c.get("b"), None);
        assert_eq!(c.get("a"), Some(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_restarts_ttl() {
        let c = cache(10, 2);
        c.set("a", 1);
        advance(Duration::from_secs(8)).await;
        c.set("a", 2);
        advance(Duration::from_secs(8)).await;
        assert_eq!(c.get("a"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timestamp_tie_breaks_on_key() {
        let c = cache(60, 3);
        c.set("m", 1);
        c.set("b", 2);
        c.set("x", 3);
        c.set("z", 4);

        assert_eq!(c.get("b"), None);
        assert_eq!(c.get("m"), Some(1));
        assert_eq!(c.get("x"), Some(3));
        assert_eq!(c.get("z"), Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_exceeds_capacity() {
        let c = cache(60, 5);
        for i in 0..50 {
            c.set(format!("k{i}"), i);
            advance(Duration::from_millis(5)).await;
            assert!(c.len() <= 5);
        }
        assert_eq!(c.len(), 5);
        assert_eq!(c.get("k49"), Some(49));
        assert_eq!(c.get("k44"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_capacity_disables_caching() {
        let c = cache(60, 0);
        c.set("a", 1);
        assert!(c.is_empty());
        assert_eq!(c.get("a"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_respect_capacity() {
        let c = Arc::new(TtlCache::new(Duration::from_secs(60), 16));
        let mut handles = Vec::new();
        for t in 0..8 {
            let c = Arc::clone(&c);
            handles.push(tokio::spawn(async move {
                for i in 0..200 {
                    c.set(format!("{t}-{i}"), i);
                    let _ = c.get(&format!("{t}-{}", i / 2));
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(c.len(), 16);
    }
}
