//! # settings-storage
//!
//! Storage abstraction layer for the settings store.
//!
//! This crate defines the repository and cache contracts every backend must
//! satisfy, and the cache-decorating repositories that add read-through
//! caching with tag-based invalidation on top of any repository.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use settings_storage::{CachePreferenceRepository, PreferenceRepository};
//!
//! let cache: Arc<dyn Cache> = Arc::new(my_cache);
//! let prefs = CachePreferenceRepository::new(my_postgres_prefs, cache);
//!
//! // First read goes to the backend and populates the cache,
//! // the second one is served from the cache.
//! prefs.find_by_ns_and_key("billing", "configuration").await?;
//! prefs.find_by_ns_and_key("billing", "configuration").await?;
//! ```

pub mod cached;
mod error;
mod traits;

pub use cached::{CacheNamespaceRepository, CachePreferenceRepository};
pub use error::CacheError;
pub use traits::{Cache, CacheExt, NamespaceRepository, PreferenceRepository};

/// Type alias for a shareable namespace repository.
pub type DynNamespaceRepository = std::sync::Arc<dyn NamespaceRepository>;

/// Type alias for a shareable preference repository.
pub type DynPreferenceRepository = std::sync::Arc<dyn PreferenceRepository>;

/// Type alias for a shareable cache.
pub type DynCache = std::sync::Arc<dyn Cache>;
