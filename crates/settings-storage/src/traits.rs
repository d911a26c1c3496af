//! Repository and cache traits.
//!
//! Implementations must be thread-safe (`Send + Sync`). The store holds no
//! locks of its own, so concurrent callers are exactly as safe as the
//! backends behind these traits.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use settings_core::{Namespace, Preference, SettingsResult};

use crate::error::CacheError;

/// Persistence contract for namespaces.
#[async_trait]
pub trait NamespaceRepository: Send + Sync {
    /// Finds a namespace by name.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::NotFound` if no namespace has this name.
    async fn find_by_name(&self, name: &str) -> SettingsResult<Namespace>;

    /// Deletes a namespace by name.
    async fn delete_by_name(&self, name: &str) -> SettingsResult<()>;

    /// Inserts or replaces a namespace.
    async fn save(&self, namespace: &Namespace) -> SettingsResult<()>;
}

/// Persistence contract for preferences.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Finds a preference by namespace and key.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::NotFound` if the pair does not exist.
    async fn find_by_ns_and_key(&self, namespace: &str, key: &str) -> SettingsResult<Preference>;

    /// Deletes a preference by namespace and key.
    async fn delete_by_ns_and_key(&self, namespace: &str, key: &str) -> SettingsResult<()>;

    /// Inserts or replaces a preference.
    async fn save(&self, preference: &Preference) -> SettingsResult<()>;
}

/// A non-authoritative, tag-aware key/value cache.
///
/// Entries are opaque bytes. Every entry may carry tags; deleting a tag
/// deletes every entry stored with it.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Stores `value` under `key`, associated with `tags`.
    async fn set(&self, key: &str, value: Vec<u8>, tags: &[String]) -> Result<(), CacheError>;

    /// Fetches the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Miss` if nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError>;

    /// Deletes the entry stored under `key`.
    async fn del_by_key(&self, key: &str) -> Result<(), CacheError>;

    /// Deletes every entry associated with `tag`.
    async fn del_by_tag(&self, tag: &str) -> Result<(), CacheError>;

    /// Returns the name of this cache backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Typed helpers over [`Cache`] using the JSON codec.
#[async_trait]
pub trait CacheExt: Cache {
    /// Serializes `value` as JSON and stores it.
    async fn set_json<T>(&self, key: &str, value: &T, tags: &[String]) -> Result<(), CacheError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, bytes, tags).await
    }

    /// Fetches a JSON entry and deserializes it into `T`.
    async fn get_json<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        let bytes = self.get(key).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

#[async_trait]
impl<T: NamespaceRepository + ?Sized> NamespaceRepository for Arc<T> {
    async fn find_by_name(&self, name: &str) -> SettingsResult<Namespace> {
        (**self).find_by_name(name).await
    }

    async fn delete_by_name(&self, name: &str) -> SettingsResult<()> {
        (**self).delete_by_name(name).await
    }

    async fn save(&self, namespace: &Namespace) -> SettingsResult<()> {
        (**self).save(namespace).await
    }
}

#[async_trait]
impl<T: PreferenceRepository + ?Sized> PreferenceRepository for Arc<T> {
    async fn find_by_ns_and_key(&self, namespace: &str, key: &str) -> SettingsResult<Preference> {
        (**self).find_by_ns_and_key(namespace, key).await
    }

    async fn delete_by_ns_and_key(&self, namespace: &str, key: &str) -> SettingsResult<()> {
        (**self).delete_by_ns_and_key(namespace, key).await
    }

    async fn save(&self, preference: &Preference) -> SettingsResult<()> {
        (**self).save(preference).await
    }
}

#[async_trait]
impl<T: Cache + ?Sized> Cache for Arc<T> {
    async fn set(&self, key: &str, value: Vec<u8>, tags: &[String]) -> Result<(), CacheError> {
        (**self).set(key, value, tags).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        (**self).get(key).await
    }

    async fn del_by_key(&self, key: &str) -> Result<(), CacheError> {
        (**self).del_by_key(key).await
    }

    async fn del_by_tag(&self, tag: &str) -> Result<(), CacheError> {
        (**self).del_by_tag(tag).await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
