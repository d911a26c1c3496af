//! In-memory backend for the settings store.
//!
//! This crate provides in-memory implementations of the repository and cache
//! traits from `settings-storage`, using `dashmap` for concurrent access.
//! They are suitable for tests, single-process embedding, and as a reference
//! for the upsert and invalidation semantics real backends must follow.
//!
//! # Example
//!
//! ```ignore
//! use settings_db_memory::{InMemoryCache, InMemoryPreferenceRepository};
//! use settings_storage::CachePreferenceRepository;
//!
//! let cache = std::sync::Arc::new(InMemoryCache::new());
//! let prefs = CachePreferenceRepository::new(InMemoryPreferenceRepository::new(), cache);
//! ```

pub mod cache;
pub mod repository;

pub use cache::InMemoryCache;
pub use repository::{InMemoryNamespaceRepository, InMemoryPreferenceRepository};
