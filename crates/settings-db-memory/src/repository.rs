//! In-memory namespace and preference repositories.

use async_trait::async_trait;
use dashmap::DashMap;
use settings_core::{Namespace, Preference, SettingsError, SettingsResult};
use settings_storage::{NamespaceRepository, PreferenceRepository};
use time::OffsetDateTime;
use tracing::trace;

/// In-memory namespace storage.
///
/// Saving an existing name keeps the stored record untouched, so `created`
/// reflects the first save.
#[derive(Debug, Default)]
pub struct InMemoryNamespaceRepository {
    data: DashMap<String, Namespace>,
}

impl InMemoryNamespaceRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored namespaces.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no namespace is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl NamespaceRepository for InMemoryNamespaceRepository {
    async fn find_by_name(&self, name: &str) -> SettingsResult<Namespace> {
        self.data
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SettingsError::namespace_not_found(name))
    }

    async fn delete_by_name(&self, name: &str) -> SettingsResult<()> {
        match self.data.remove(name) {
            Some(_) => {
                trace!(namespace = %name, "Namespace deleted");
                Ok(())
            }
            None => Err(SettingsError::namespace_not_found(name)),
        }
    }

    async fn save(&self, namespace: &Namespace) -> SettingsResult<()> {
        if namespace.name.is_empty() {
            return Err(SettingsError::storage("namespace name must not be empty"));
        }
        self.data
            .entry(namespace.name.clone())
            .or_insert_with(|| namespace.clone());
        trace!(namespace = %namespace, "Namespace saved");
        Ok(())
    }
}

type PreferenceKey = (String, String);

/// In-memory preference storage.
///
/// Saving an existing `(namespace, key)` replaces the value, refreshes
/// `updated` and keeps `created`.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceRepository {
    data: DashMap<PreferenceKey, Preference>,
}

impl InMemoryPreferenceRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored preferences.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no preference is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn preference_key(namespace: &str, key: &str) -> PreferenceKey {
    (namespace.to_string(), key.to_string())
}

#[async_trait]
impl PreferenceRepository for InMemoryPreferenceRepository {
    async fn find_by_ns_and_key(&self, namespace: &str, key: &str) -> SettingsResult<Preference> {
        self.data
            .get(&preference_key(namespace, key))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SettingsError::preference_not_found(namespace, key))
    }

    async fn delete_by_ns_and_key(&self, namespace: &str, key: &str) -> SettingsResult<()> {
        match self.data.remove(&preference_key(namespace, key)) {
            Some(_) => {
                trace!(namespace = %namespace, key = %key, "Preference deleted");
                Ok(())
            }
            None => Err(SettingsError::preference_not_found(namespace, key)),
        }
    }

    async fn save(&self, preference: &Preference) -> SettingsResult<()> {
        let now = OffsetDateTime::now_utc();
        self.data
            .entry(preference_key(&preference.namespace, &preference.key))
            .and_modify(|existing| {
                existing.value = preference.value.clone();
                existing.updated = now;
            })
            .or_insert_with(|| preference.clone());
        trace!(preference = %preference, "Preference saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_namespace_upsert_keeps_created() {
        let repo = InMemoryNamespaceRepository::new();
        let first = Namespace::new("billing");
        repo.save(&first).await.unwrap();

        let mut again = Namespace::new("billing");
        again.created += time::Duration::hours(1);
        repo.save(&again).await.unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find_by_name("billing").await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_namespace_not_found() {
        let repo = InMemoryNamespaceRepository::new();
        assert!(repo.find_by_name("nope").await.unwrap_err().is_not_found());
        assert!(repo.delete_by_name("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_empty_namespace_name_rejected() {
        let repo = InMemoryNamespaceRepository::new();
        let err = repo.save(&Namespace::new("")).await.unwrap_err();
        assert!(matches!(err, SettingsError::Storage { .. }));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_preference_upsert_replaces_value() {
        let repo = InMemoryPreferenceRepository::new();

        let mut first = Preference::new("billing", "configuration");
        first.set_value(&json!({"plan": "free"})).unwrap();
        repo.save(&first).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        let mut second = Preference::new("billing", "configuration");
        second.set_value(&json!({"plan": "pro"})).unwrap();
        repo.save(&second).await.unwrap();

        let stored = repo
            .find_by_ns_and_key("billing", "configuration")
            .await
            .unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(stored.raw_value(), Some(r#"{"plan":"pro"}"#));
        assert_eq!(stored.created, first.created);
        assert!(stored.updated > first.updated);
    }

    #[tokio::test]
    async fn test_preference_delete() {
        let repo = InMemoryPreferenceRepository::new();
        repo.save(&Preference::new("billing", "configuration"))
            .await
            .unwrap();

        repo.delete_by_ns_and_key("billing", "configuration")
            .await
            .unwrap();
        assert!(repo.is_empty());
        let err = repo
            .delete_by_ns_and_key("billing", "configuration")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
