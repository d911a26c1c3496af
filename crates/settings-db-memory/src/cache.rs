//! In-memory tag-aware cache.
//!
//! Entries live in a `DashMap` keyed by cache key. A second map indexes keys
//! by tag so `del_by_tag` removes every entry stored with that tag. Each entry
//! remembers its own tags, so removing an entry by any path also drops it
//! from the index. An optional time-to-live expires entries lazily on read;
//! writes sweep whatever else has expired.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use settings_storage::{Cache, CacheError};
use tracing::trace;

#[derive(Debug)]
struct CacheEntry {
    value: Vec<u8>,
    tags: Vec<String>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory implementation of [`Cache`].
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
    /// Tag -> keys currently stored with that tag.
    tags: DashMap<String, HashSet<String>>,
    ttl: Option<Duration>,
}

impl InMemoryCache {
    /// Creates a cache whose entries never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache whose entries expire `ttl` after being set.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Returns true if a live entry is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Returns the number of stored entries, expired ones not yet swept
    /// included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry and tag.
    pub fn clear(&self) {
        self.entries.clear();
        self.tags.clear();
    }

    /// Drops `key` from the index of each tag, removing tags left empty.
    ///
    /// A tag still carried by the entry now stored under `key` is kept, so a
    /// concurrent `set` of the same key stays reachable by tag.
    fn untag(&self, key: &str, tags: &[String]) {
        for tag in tags {
            self.tags.remove_if_mut(tag, |_, keys| {
                let retagged = self
                    .entries
                    .get(key)
                    .is_some_and(|entry| entry.tags.contains(tag));
                if !retagged {
                    keys.remove(key);
                }
                keys.is_empty()
            });
        }
    }

    fn evict(&self, key: &str) {
        if let Some((_, entry)) = self.entries.remove(key) {
            self.untag(key, &entry.tags);
        }
    }

    fn evict_expired(&self, key: &str) {
        if let Some((_, entry)) = self.entries.remove_if(key, |_, entry| entry.is_expired()) {
            self.untag(key, &entry.tags);
            trace!(key = %key, "Expired cache entry evicted");
        }
    }

    fn sweep_expired(&self) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.is_expired())
            .map(|entry| entry.key().clone())
            .collect();
        for key in &expired {
            self.evict_expired(key);
        }
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn set(&self, key: &str, value: Vec<u8>, tags: &[String]) -> Result<(), CacheError> {
        if self.ttl.is_some() {
            self.sweep_expired();
        }

        let entry = CacheEntry {
            value,
            tags: tags.to_vec(),
            expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
        };
        if let Some(previous) = self.entries.insert(key.to_string(), entry) {
            self.untag(key, &previous.tags);
        }
        for tag in tags {
            self.tags
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired()).then(|| entry.value.clone()));

        match lookup {
            Some(Some(value)) => Ok(value),
            Some(None) => {
                self.evict_expired(key);
                Err(CacheError::miss(key))
            }
            None => Err(CacheError::miss(key)),
        }
    }

    async fn del_by_key(&self, key: &str) -> Result<(), CacheError> {
        self.evict(key);
        Ok(())
    }

    async fn del_by_tag(&self, tag: &str) -> Result<(), CacheError> {
        if let Some((_, keys)) = self.tags.remove(tag) {
            for key in &keys {
                self.evict(key);
            }
            trace!(tag = %tag, count = keys.len(), "Cache tag invalidated");
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_set_get_and_miss() {
        let cache = InMemoryCache::new();
        cache.set("a", b"1".to_vec(), &[]).await.unwrap();

        assert_eq!(cache.get("a").await.unwrap(), b"1".to_vec());
        assert!(cache.get("b").await.unwrap_err().is_miss());
    }

    #[tokio::test]
    async fn test_del_by_tag_removes_all_tagged_entries() {
        let cache = InMemoryCache::new();
        cache.set("a", b"1".to_vec(), &tags(&["t1"])).await.unwrap();
        cache
            .set("b", b"2".to_vec(), &tags(&["t1", "t2"]))
            .await
            .unwrap();
        cache.set("c", b"3".to_vec(), &tags(&["t2"])).await.unwrap();

        cache.del_by_tag("t1").await.unwrap();

        assert!(!cache.contains_key("a"));
        assert!(!cache.contains_key("b"));
        assert!(cache.contains_key("c"));

        cache.del_by_tag("unknown").await.unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_del_by_key() {
        let cache = InMemoryCache::new();
        cache.set("a", b"1".to_vec(), &tags(&["t"])).await.unwrap();
        cache.del_by_key("a").await.unwrap();
        cache.del_by_key("a").await.unwrap();

        assert!(cache.is_empty());
        assert!(cache.tags.is_empty());
        cache.del_by_tag("t").await.unwrap();
    }

    #[tokio::test]
    async fn test_overwrite_moves_key_to_new_tags() {
        let cache = InMemoryCache::new();
        cache.set("a", b"1".to_vec(), &tags(&["old"])).await.unwrap();
        cache.set("a", b"2".to_vec(), &tags(&["new"])).await.unwrap();

        assert!(!cache.tags.contains_key("old"));
        cache.del_by_tag("old").await.unwrap();
        assert!(cache.contains_key("a"));

        cache.del_by_tag("new").await.unwrap();
        assert!(cache.is_empty());
        assert!(cache.tags.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entries_are_swept_on_write() {
        let cache = InMemoryCache::with_ttl(Duration::from_millis(20));
        for key in ["a", "b", "c"] {
            cache.set(key, b"1".to_vec(), &tags(&[key])).await.unwrap();
        }
        assert_eq!(cache.len(), 3);

        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.set("d", b"1".to_vec(), &tags(&["d"])).await.unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key("d"));
        assert_eq!(cache.tags.len(), 1);
        assert!(cache.tags.contains_key("d"));
    }

    #[tokio::test]
    async fn test_ttl_expires_entries() {
        let cache = InMemoryCache::with_ttl(Duration::from_millis(20));
        cache.set("a", b"1".to_vec(), &tags(&["t"])).await.unwrap();
        assert!(cache.contains_key("a"));

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(!cache.contains_key("a"));
        assert!(cache.get("a").await.unwrap_err().is_miss());
        assert!(cache.is_empty());
        assert!(cache.tags.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = InMemoryCache::new();
        cache.set("a", b"1".to_vec(), &tags(&["t"])).await.unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
