//! Static configuration sources for the settings store.
//!
//! A [`Configurer`] is a read-only source of configuration values addressed
//! by dotted key paths (`billing.plan`). The settings store consults it only
//! when a lookup misses both the cache and persistence.
//!
//! [`LayeredConfigurer`] merges files, inline documents and environment
//! variables with the `config` crate, later sources winning:
//!
//! ```text
//!   settings.toml  ──┐
//!   inline JSON    ──┼──► config::Config ──► ArcSwap snapshot ──► has / lookup
//!   SETTINGS__*    ──┘
//! ```

pub mod layered;

pub use layered::{LayeredConfigurer, LayeredConfigurerBuilder};

use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Key not found: {key}")]
    NotFound { key: String },

    #[error("Failed to decode key `{key}`: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Source error: {0}")]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Returns `true` if the key is absent from every source.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A read-only, key-addressable configuration source.
pub trait Configurer: Send + Sync {
    /// Returns true if `name` resolves to a value. Has no side effects.
    fn has(&self, name: &str) -> bool;

    /// Returns the value stored under `name`.
    fn lookup(&self, name: &str) -> Result<serde_json::Value>;
}

/// Typed decoding on top of [`Configurer::lookup`].
pub trait ConfigurerExt: Configurer {
    /// Decodes the value stored under `name` into `T`.
    fn unmarshal_key<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self.lookup(name)?;
        serde_json::from_value(value).map_err(|source| ConfigError::Decode {
            key: name.to_string(),
            source,
        })
    }
}

impl<C: Configurer + ?Sized> ConfigurerExt for C {}

impl<T: Configurer + ?Sized> Configurer for Arc<T> {
    fn has(&self, name: &str) -> bool {
        (**self).has(name)
    }

    fn lookup(&self, name: &str) -> Result<serde_json::Value> {
        (**self).lookup(name)
    }
}
