//! Cache-decorating repositories.
//!
//! [`CacheNamespaceRepository`] and [`CachePreferenceRepository`] wrap an
//! inner repository and add:
//!
//! - read-through caching: reads are served from the cache when possible and
//!   populate it on a miss. Errors from the inner repository, not found
//!   included, are never cached. A cached record whose identity differs from
//!   the lookup is treated as a miss.
//! - tag-based invalidation: every save or delete invalidates the tag of the
//!   affected record once the inner call has finished, whatever its outcome.
//!
//! The cache is best-effort. A failing cache degrades to the inner repository
//! and never changes the result of an operation.
//!
//! # Example
//!
//! ```ignore
//! use settings_storage::CacheNamespaceRepository;
//!
//! let namespaces = CacheNamespaceRepository::new(postgres_namespaces, cache.clone());
//! namespaces.save(&Namespace::new("billing")).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use settings_core::{Namespace, Preference, SettingsResult, keys};
use tracing::{debug, warn};

use crate::traits::{Cache, CacheExt, NamespaceRepository, PreferenceRepository};

/// A namespace repository wrapper adding read-through caching.
pub struct CacheNamespaceRepository<R: NamespaceRepository> {
    inner: R,
    cache: Arc<dyn Cache>,
}

impl<R: NamespaceRepository> CacheNamespaceRepository<R> {
    /// Create a new caching wrapper around `inner`.
    pub fn new(inner: R, cache: Arc<dyn Cache>) -> Self {
        Self { inner, cache }
    }

    /// Get a reference to the inner repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Get a reference to the cache.
    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }
}

#[async_trait]
impl<R: NamespaceRepository> NamespaceRepository for CacheNamespaceRepository<R> {
    async fn find_by_name(&self, name: &str) -> SettingsResult<Namespace> {
        let key = keys::namespace_key(name);
        if let Some(namespace) = read_cached::<Namespace>(self.cache.as_ref(), &key).await {
            if namespace.name == name {
                return Ok(namespace);
            }
            warn!(
                key = %key,
                cached = %namespace,
                "Cached record belongs to another namespace, reading through"
            );
        }

        let namespace = self.inner.find_by_name(name).await?;
        populate(
            self.cache.as_ref(),
            &key,
            &namespace,
            keys::namespace_tag(name),
        )
        .await;

        Ok(namespace)
    }

    async fn delete_by_name(&self, name: &str) -> SettingsResult<()> {
        let guard = InvalidationGuard::new(self.cache.clone(), keys::namespace_tag(name));
        let result = self.inner.delete_by_name(name).await;
        guard.invalidate().await;
        result
    }

    async fn save(&self, namespace: &Namespace) -> SettingsResult<()> {
        let guard =
            InvalidationGuard::new(self.cache.clone(), keys::namespace_tag(&namespace.name));
        let result = self.inner.save(namespace).await;
        guard.invalidate().await;
        result
    }
}

impl<R: NamespaceRepository> std::fmt::Debug for CacheNamespaceRepository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheNamespaceRepository")
            .field("cache", &self.cache.backend_name())
            .finish()
    }
}

/// A preference repository wrapper adding read-through caching.
pub struct CachePreferenceRepository<R: PreferenceRepository> {
    inner: R,
    cache: Arc<dyn Cache>,
}

impl<R: PreferenceRepository> CachePreferenceRepository<R> {
    /// Create a new caching wrapper around `inner`.
    pub fn new(inner: R, cache: Arc<dyn Cache>) -> Self {
        Self { inner, cache }
    }

    /// Get a reference to the inner repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Get a reference to the cache.
    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }
}

#[async_trait]
impl<R: PreferenceRepository> PreferenceRepository for CachePreferenceRepository<R> {
    async fn find_by_ns_and_key(&self, namespace: &str, key: &str) -> SettingsResult<Preference> {
        let cache_key = keys::preference_key(namespace, key);
        // Keys join namespace and key with `:`, so distinct pairs can share one.
        if let Some(preference) = read_cached::<Preference>(self.cache.as_ref(), &cache_key).await
        {
            if preference.namespace == namespace && preference.key == key {
                return Ok(preference);
            }
            warn!(
                key = %cache_key,
                cached = %preference,
                "Cached record belongs to another preference, reading through"
            );
        }

        let preference = self.inner.find_by_ns_and_key(namespace, key).await?;
        populate(
            self.cache.as_ref(),
            &cache_key,
            &preference,
            keys::preference_tag(namespace, key),
        )
        .await;

        Ok(preference)
    }

    async fn delete_by_ns_and_key(&self, namespace: &str, key: &str) -> SettingsResult<()> {
        let guard =
            InvalidationGuard::new(self.cache.clone(), keys::preference_tag(namespace, key));
        let result = self.inner.delete_by_ns_and_key(namespace, key).await;
        guard.invalidate().await;
        result
    }

    async fn save(&self, preference: &Preference) -> SettingsResult<()> {
        let guard = InvalidationGuard::new(
            self.cache.clone(),
            keys::preference_tag(&preference.namespace, &preference.key),
        );
        let result = self.inner.save(preference).await;
        guard.invalidate().await;
        result
    }
}

impl<R: PreferenceRepository> std::fmt::Debug for CachePreferenceRepository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachePreferenceRepository")
            .field("cache", &self.cache.backend_name())
            .finish()
    }
}

async fn read_cached<T>(cache: &dyn Cache, key: &str) -> Option<T>
where
    T: DeserializeOwned + Send,
{
    match cache.get_json(key).await {
        Ok(value) => {
            debug!(key = %key, "Cache hit");
            Some(value)
        }
        Err(e) if e.is_miss() => {
            debug!(key = %key, "Cache miss");
            None
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Cache read failed, falling back to repository");
            None
        }
    }
}

/// Stores a record in the cache. Failures are logged and dropped.
async fn populate<T>(cache: &dyn Cache, key: &str, value: &T, tag: String)
where
    T: Serialize + Sync + ?Sized,
{
    match cache.set_json(key, value, &[tag]).await {
        Ok(()) => debug!(key = %key, "Cache populated"),
        Err(e) => warn!(key = %key, error = %e, "Failed to populate cache"),
    }
}

async fn invalidate(cache: &dyn Cache, tag: &str) {
    match cache.del_by_tag(tag).await {
        Ok(()) => debug!(tag = %tag, "Cache tag invalidated"),
        Err(e) => warn!(tag = %tag, error = %e, "Failed to invalidate cache tag"),
    }
}

/// Invalidates a cache tag when the surrounding write finishes.
///
/// The normal path awaits [`InvalidationGuard::invalidate`]. If the write
/// never gets there (the inner repository panicked or the caller dropped the
/// future), `Drop` spawns the invalidation on the current tokio runtime.
struct InvalidationGuard {
    cache: Option<Arc<dyn Cache>>,
    tag: String,
}

impl InvalidationGuard {
    fn new(cache: Arc<dyn Cache>, tag: String) -> Self {
        Self {
            cache: Some(cache),
            tag,
        }
    }

    async fn invalidate(mut self) {
        if let Some(cache) = self.cache.take() {
            invalidate(cache.as_ref(), &self.tag).await;
        }
    }
}

impl Drop for InvalidationGuard {
    fn drop(&mut self) {
        let Some(cache) = self.cache.take() else {
            return;
        };
        let tag = std::mem::take(&mut self.tag);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    invalidate(cache.as_ref(), &tag).await;
                });
            }
            Err(_) => {
                warn!(tag = %tag, "No runtime to invalidate cache tag, entry left to expire");
            }
        }
    }
}
