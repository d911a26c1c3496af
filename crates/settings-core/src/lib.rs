//! # settings-core
//!
//! Entities and shared vocabulary for the settings store.
//!
//! - [`Namespace`]: a named grouping of preferences.
//! - [`Preference`]: a namespace-scoped key holding an opaque serialized value.
//! - [`SettingsError`]: the error type every layer of the store returns.
//! - [`constants`] and [`keys`]: reserved identifiers and the cache key scheme.
//!
//! ## Example
//!
//! ```
//! use settings_core::Preference;
//!
//! let mut pref = Preference::new("billing", "configuration");
//! pref.set_value(&serde_json::json!({ "plan": "pro", "seats": 12 })).unwrap();
//!
//! let value: serde_json::Value = pref.load_value().unwrap();
//! assert_eq!(value["seats"].as_u64(), Some(12));
//! ```

pub mod constants;
mod error;
pub mod keys;
mod namespace;
mod preference;

pub use constants::{KEY_CONFIGURATION, NAMESPACE_SYSTEM};
pub use error::{ErrorKind, SettingsError};
pub use namespace::Namespace;
pub use preference::Preference;

/// Type alias for a settings result.
pub type SettingsResult<T> = Result<T, SettingsError>;
