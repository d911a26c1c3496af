//! Layered settings resolution.
//!
//! A caller asks the top-level [`Service`] for a configuration or a namespace
//! alias. Resolution falls through, in order:
//!
//! 1. the cache, via the cache-decorating repositories,
//! 2. the persistent repositories (populating the cache on the way back),
//! 3. the static [`Configurer`](settings_config::Configurer), whose answer is
//!    seeded into the cache but never persisted.
//!
//! Namespaces can be addressed directly by their physical name or through a
//! logical alias stored in the reserved `system` namespace (the
//! `*_by_namespace` operations).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use settings_service::{Service, new_service};
//!
//! let service = new_service(namespaces, preferences, configurer, cache);
//!
//! service.save_config("billing-eu", &Billing { plan: "pro".into() }).await?;
//! service.set_namespace_value("billing", "billing-eu").await?;
//!
//! let billing: Billing = service.load_config_by_namespace("billing").await?;
//! ```

mod configurer_loader;
mod loader;
mod service;

pub use configurer_loader::ConfigurerLoader;
pub use loader::Loader;
pub use service::Service;

use std::sync::Arc;

use settings_config::Configurer;
use settings_storage::{
    Cache, CacheNamespaceRepository, CachePreferenceRepository, NamespaceRepository,
    PreferenceRepository,
};

/// The fully wired service returned by [`new_service`].
pub type SettingsService = ConfigurerLoader<Loader>;

/// Wires the full resolution chain over the given backends.
///
/// Both repositories are wrapped in cache decorators sharing `cache`, the
/// same cache the configurer fallback seeds.
pub fn new_service<N, P>(
    ns_repo: N,
    pref_repo: P,
    configurer: Arc<dyn Configurer>,
    cache: Arc<dyn Cache>,
) -> SettingsService
where
    N: NamespaceRepository + 'static,
    P: PreferenceRepository + 'static,
{
    let loader = Loader::new(
        Arc::new(CacheNamespaceRepository::new(ns_repo, cache.clone())),
        Arc::new(CachePreferenceRepository::new(pref_repo, cache.clone())),
    );
    ConfigurerLoader::new(loader, configurer, cache)
}
