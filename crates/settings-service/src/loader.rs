//! Core resolution over the namespace and preference repositories.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use settings_core::{
    KEY_CONFIGURATION, NAMESPACE_SYSTEM, Namespace, Preference, SettingsResult,
};
use settings_storage::{DynNamespaceRepository, DynPreferenceRepository};
use tracing::debug;

use crate::service::Service;

/// Resolves aliases and configurations from the repositories.
///
/// Aliases are preferences in the `system` namespace keyed by logical name;
/// configurations are the `configuration` preference of their namespace.
/// Writes always upsert the namespace record before the preference, because
/// loading a configuration requires the namespace to exist.
#[derive(Clone)]
pub struct Loader {
    ns_repo: DynNamespaceRepository,
    pref_repo: DynPreferenceRepository,
}

impl Loader {
    /// Create a new loader over the given repositories.
    pub fn new(ns_repo: DynNamespaceRepository, pref_repo: DynPreferenceRepository) -> Self {
        Self { ns_repo, pref_repo }
    }

    async fn system_value(&self, key: &str) -> SettingsResult<String> {
        let pref = self
            .pref_repo
            .find_by_ns_and_key(NAMESPACE_SYSTEM, key)
            .await
            .map_err(|e| e.context(format!("system preference `{key}` not found")))?;

        pref.load_value()
            .map_err(|e| e.context(format!("namespace of system preference `{key}` not found")))
    }

    async fn configuration(&self, namespace: &str) -> SettingsResult<Preference> {
        self.pref_repo
            .find_by_ns_and_key(namespace, KEY_CONFIGURATION)
            .await
            .map_err(|e| e.context(format!("configuration preference `{namespace}` not found")))
    }

    /// Upserts `owner`, then `preference`.
    async fn upsert(&self, owner: &str, preference: &Preference) -> SettingsResult<()> {
        self.ns_repo.save(&Namespace::new(owner)).await?;
        self.pref_repo.save(preference).await
    }
}

#[async_trait]
impl Service for Loader {
    async fn get_namespace_value(&self, namespace: &str) -> SettingsResult<String> {
        self.system_value(namespace).await
    }

    async fn set_namespace_value(&self, namespace: &str, value: &str) -> SettingsResult<()> {
        let mut pref = Preference::new(NAMESPACE_SYSTEM, namespace);
        pref.set_value(value)?;
        self.upsert(value, &pref).await?;
        debug!(namespace = %namespace, target = %value, "Namespace alias saved");
        Ok(())
    }

    async fn remove_namespace_value(&self, namespace: &str) -> SettingsResult<()> {
        self.pref_repo
            .delete_by_ns_and_key(NAMESPACE_SYSTEM, namespace)
            .await?;
        debug!(namespace = %namespace, "Namespace alias removed");
        Ok(())
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
        let value = self.get_namespace_value(namespace).await?;
        self.save_config(&value, config).await
    }

    async fn remove_config_by_namespace(&self, namespace: &str) -> SettingsResult<()> {
        let value = self.get_namespace_value(namespace).await?;
        self.remove_config(&value).await
    }

    async fn load_config<T>(&self, namespace: &str) -> SettingsResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        self.ns_repo
            .find_by_name(namespace)
            .await
            .map_err(|e| e.context(format!("namespace `{namespace}` not found")))?;

        self.configuration(namespace).await?.load_value()
    }

    async fn save_config<T>(&self, namespace: &str, config: &T) -> SettingsResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let mut pref = Preference::new(namespace, KEY_CONFIGURATION);
        pref.set_value(config)?;
        self.upsert(namespace, &pref).await?;
        debug!(namespace = %namespace, "Configuration saved");
        Ok(())
    }

    async fn remove_config(&self, namespace: &str) -> SettingsResult<()> {
        self.pref_repo
            .delete_by_ns_and_key(namespace, KEY_CONFIGURATION)
            .await?;
        self.ns_repo.delete_by_name(namespace).await?;
        debug!(namespace = %namespace, "Configuration removed");
        Ok(())
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader").finish_non_exhaustive()
    }
}
