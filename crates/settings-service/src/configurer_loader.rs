//! Static configuration fallback.
//!
//! [`ConfigurerLoader`] wraps another [`Service`] and answers the two lookup
//! operations from a [`Configurer`] when the wrapped service fails. Answers
//! from the configurer are seeded into the cache under the same keys and tags
//! the cache-decorating repositories use, so later reads (including alias
//! resolution inside the wrapped service) are served from the cache. They
//! are never written to persistence; an explicit save does that.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use settings_config::{Configurer, ConfigurerExt};
use settings_core::{
    KEY_CONFIGURATION, NAMESPACE_SYSTEM, Namespace, Preference, SettingsError, SettingsResult,
    keys,
};
use settings_storage::{Cache, CacheExt};
use tracing::{debug, warn};

use crate::service::Service;

/// A service wrapper falling back to a static configurer on lookup misses.
pub struct ConfigurerLoader<S: Service> {
    inner: S,
    configurer: Arc<dyn Configurer>,
    cache: Arc<dyn Cache>,
}

impl<S: Service> ConfigurerLoader<S> {
    /// Create a new fallback wrapper around `inner`.
    pub fn new(inner: S, configurer: Arc<dyn Configurer>, cache: Arc<dyn Cache>) -> Self {
        Self {
            inner,
            configurer,
            cache,
        }
    }

    /// Get a reference to the wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get a reference to the configurer.
    pub fn configurer(&self) -> &Arc<dyn Configurer> {
        &self.configurer
    }

    async fn seed_preference(&self, preference: &Preference) {
        let key = keys::preference_key(&preference.namespace, &preference.key);
        let tag = keys::preference_tag(&preference.namespace, &preference.key);
        self.seed(&key, preference, tag).await;
    }

    async fn seed_namespace(&self, namespace: &Namespace) {
        let key = keys::namespace_key(&namespace.name);
        let tag = keys::namespace_tag(&namespace.name);
        self.seed(&key, namespace, tag).await;
    }

    async fn seed<T>(&self, key: &str, value: &T, tag: String)
    where
        T: Serialize + Sync,
    {
        match self.cache.set_json(key, value, &[tag]).await {
            Ok(()) => debug!(key = %key, "Cache seeded from configurer"),
            Err(e) => warn!(key = %key, error = %e, "Failed to seed cache from configurer"),
        }
    }
}

#[async_trait]
impl<S: Service> Service for ConfigurerLoader<S> {
    async fn get_namespace_value(&self, namespace: &str) -> SettingsResult<String> {
        let err = match self.inner.get_namespace_value(namespace).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !self.configurer.has(namespace) {
            return Err(err);
        }

        let value: String = self
            .configurer
            .unmarshal_key(namespace)
            .map_err(SettingsError::configurer)?;
        debug!(namespace = %namespace, target = %value, "Namespace alias resolved from configurer");

        let mut pref = Preference::new(NAMESPACE_SYSTEM, namespace);
        match pref.set_value(&value) {
            Ok(()) => self.seed_preference(&pref).await,
            Err(e) => warn!(namespace = %namespace, error = %e, "Skipping cache seed"),
        }

        Ok(value)
    }

    async fn set_namespace_value(&self, namespace: &str, value: &str) -> SettingsResult<()> {
        self.inner.set_namespace_value(namespace, value).await
    }

    async fn remove_namespace_value(&self, namespace: &str) -> SettingsResult<()> {
        self.inner.remove_namespace_value(namespace).await
    }

    async fn load_config_by_namespace<T>(&self, namespace: &str) -> SettingsResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let value = self.get_namespace_value(namespace).await?;
        self.load_config(&value).await
    }

    async fn save_config_by_namespace<T>(&self, namespace: &str, config: &T) -> SettingsResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.inner.save_config_by_namespace(namespace, config).await
    }

    async fn remove_config_by_namespace(&self, namespace: &str) -> SettingsResult<()> {
        self.inner.remove_config_by_namespace(namespace).await
    }

    async fn load_config<T>(&self, namespace: &str) -> SettingsResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let err = match self.inner.load_config::<T>(namespace).await {
            Ok(config) => return Ok(config),
            Err(e) => e,
        };

        if !self.configurer.has(namespace) {
            return Err(err);
        }

        let config: T = self
            .configurer
            .unmarshal_key(namespace)
            .map_err(SettingsError::configurer)?;
        debug!(namespace = %namespace, "Configuration resolved from configurer");

        let mut pref = Preference::new(namespace, KEY_CONFIGURATION);
        match pref.set_value(&config) {
            Ok(()) => {
                self.seed_namespace(&Namespace::new(namespace)).await;
                self.seed_preference(&pref).await;
            }
            Err(e) => warn!(namespace = %namespace, error = %e, "Skipping cache seed"),
        }

        Ok(config)
    }

    async fn save_config<T>(&self, namespace: &str, config: &T) -> SettingsResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.inner.save_config(namespace, config).await
    }

    async fn remove_config(&self, namespace: &str) -> SettingsResult<()> {
        self.inner.remove_config(namespace).await
    }
}

impl<S: Service + std::fmt::Debug> std::fmt::Debug for ConfigurerLoader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurerLoader")
            .field("inner", &self.inner)
            .field("cache", &self.cache.backend_name())
            .finish()
    }
}
