use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use settings_core::SettingsResult;

/// Settings resolution operations.
///
/// Namespace values are aliases: `get_namespace_value("billing")` returns the
/// physical namespace the logical name `billing` points to. The
/// `*_by_namespace` operations resolve the alias first and then act on the
/// physical namespace.
///
/// Loaded configurations must also be `Serialize` so that a layer can cache
/// what it resolved.
#[async_trait]
pub trait Service: Send + Sync {
    /// Resolves a logical namespace name to its physical namespace.
    ///
    /// # Errors
    ///
    /// Returns a not found error if no alias exists for `namespace`.
    async fn get_namespace_value(&self, namespace: &str) -> SettingsResult<String>;

    /// Points the logical name `namespace` at the physical namespace `value`.
    async fn set_namespace_value(&self, namespace: &str, value: &str) -> SettingsResult<()>;

    /// Removes the alias only. The physical namespace and its data stay.
    async fn remove_namespace_value(&self, namespace: &str) -> SettingsResult<()>;

    /// Loads the configuration of the namespace `namespace` is aliased to.
    async fn load_config_by_namespace<T>(&self, namespace: &str) -> SettingsResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync;

    /// Saves the configuration of the namespace `namespace` is aliased to.
    async fn save_config_by_namespace<T>(&self, namespace: &str, config: &T) -> SettingsResult<()>
    where
        T: Serialize + Sync + ?Sized;

    /// Removes the configuration of the namespace `namespace` is aliased to.
    async fn remove_config_by_namespace(&self, namespace: &str) -> SettingsResult<()>;

    /// Loads the configuration stored in a physical namespace.
    ///
    /// # Errors
    ///
    /// Returns a not found error if the namespace or its configuration is
    /// missing, and a deserialization error if the stored payload does not
    /// fit `T`.
    async fn load_config<T>(&self, namespace: &str) -> SettingsResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync;

    /// Creates the namespace if needed and stores its configuration.
    async fn save_config<T>(&self, namespace: &str, config: &T) -> SettingsResult<()>
    where
        T: Serialize + Sync + ?Sized;

    /// Deletes the configuration of a namespace, then the namespace.
    async fn remove_config(&self, namespace: &str) -> SettingsResult<()>;
}
