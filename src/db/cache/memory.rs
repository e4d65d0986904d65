use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use super::store::CacheStore;
use crate::error::CacheResult;

/// Entry count that triggers the first sweep of expired keys
const SWEEP_THRESHOLD: usize = 1024;

/// Writes sweep at least this often, whatever the entry count
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Hard cap; past it the entry closest to expiry is evicted
const MAX_ENTRIES: usize = 100_000;

struct Entry {
    value: String,
    expires_at: Instant,
}

struct Inner {
    entries: HashMap<String, Entry>,
    sweep_at: usize,
    next_sweep: Instant,
}

impl Inner {
    fn sweep(&mut self, now: Instant) {
        self.entries.retain(|_, entry| entry.expires_at > now);
        self.sweep_at = SWEEP_THRESHOLD.max(self.entries.len() * 2);
        self.next_sweep = now + SWEEP_INTERVAL;
    }

    fn evict_soonest(&mut self) {
        let soonest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = soonest {
            self.entries.remove(&key);
        }
    }
}

/// In-process TTL store, for single-instance deployments and tests
///
/// Expired entries are dropped on read and swept in bulk on write, so the map stays
/// bounded by what is live.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                sweep_at: SWEEP_THRESHOLD,
                next_sweep: Instant::now() + SWEEP_INTERVAL,
            }),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        {
            let inner = self.inner.read().await;
            match inner.entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {}
            }
        }

        // Expired: drop it unless a fresh write raced in
        let mut inner = self.inner.write().await;
        if inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            inner.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        let entry = Entry {
            value,
            expires_at: now + ttl,
        };

        let mut inner = self.inner.write().await;
        if inner.entries.len() >= inner.sweep_at || now >= inner.next_sweep {
            inner.sweep(now);
        }
        if inner.entries.len() >= MAX_ENTRIES && !inner.entries.contains_key(key) {
            inner.evict_soonest();
        }
        inner.entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
