use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// In-process cache client.
///
/// Used when no Valkey/Redis is configured (development) and in tests.
/// Entries live only as long as the process; expired entries are dropped lazily on access.
#[derive(Clone, Default)]
pub struct MemoryCacheClient {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryCacheClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, Entry>, Instant) -> T,
    ) -> CacheResult<T> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| CacheError::BackendCommand("memory cache lock poisoned".into()))?;
        Ok(f(&mut guard, Instant::now()))
    }
}

fn live<'a>(
    entries: &'a mut HashMap<String, Entry>,
    key: &str,
    now: Instant,
) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|e| e.expires_at <= now) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

#[async_trait]
impl CacheClient for MemoryCacheClient {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_and_touch(&self, key: &str, ttl: Duration) -> CacheResult<Option<String>> {
        self.with_entries(|entries, now| {
            live(entries, key, now).map(|e| {
                e.expires_at = now + ttl;
                e.value.clone()
            })
        })
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<bool> {
        self.with_entries(|entries, now| {
            if live(entries, key, now).is_some() {
                return false;
            }
            entries.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at: now + ttl,
                },
            );
            true
        })
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        self.with_entries(|entries, now| match live(entries, key, now) {
            Some(_) => {
                entries.remove(key);
                1
            }
            None => 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_if_absent_only_once() {
        let c = MemoryCacheClient::new();
        let ttl = Duration::from_secs(60);
        assert!(c.set_if_absent_with_ttl("k", "v1", ttl).await.unwrap());
        assert!(!c.set_if_absent_with_ttl("k", "v2", ttl).await.unwrap());
        assert_eq!(c.get_and_touch("k", ttl).await.unwrap().as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn expired_entries_disappear() {
        let c = MemoryCacheClient::new();
        assert!(c.set_if_absent_with_ttl("k", "v", Duration::ZERO).await.unwrap());
        assert_eq!(c.get_and_touch("k", Duration::from_secs(5)).await.unwrap(), None);
        assert_eq!(c.del("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn del_reports_count() {
        let c = MemoryCacheClient::new();
        assert!(c.set_if_absent_with_ttl("k", "v", Duration::from_secs(5)).await.unwrap());
        assert_eq!(c.del("k").await.unwrap(), 1);
        assert_eq!(c.del("k").await.unwrap(), 0);
    }
}
