use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use time::OffsetDateTime;

use crate::error::SettingsError;

/// A single namespace-scoped key/value record.
///
/// Identity is the `(namespace, key)` pair. The value is kept as the exact
/// serialized JSON text, so numbers survive any number of round trips through
/// storage and cache without being coerced to floats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub namespace: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Box<RawValue>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
}

impl Preference {
    /// Creates a preference without a value, stamped with the current time.
    #[must_use]
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            namespace: namespace.into(),
            key: key.into(),
            value: None,
            created: now,
            updated: now,
        }
    }

    /// Serializes `value` into the payload, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Serialization` if `value` is not representable
    /// as JSON (for example a map with non-string keys).
    pub fn set_value<T>(&mut self, value: &T) -> Result<(), SettingsError>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::value::to_raw_value(value).map_err(SettingsError::Serialization)?;
        self.value = Some(raw);
        Ok(())
    }

    /// Deserializes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Deserialization` if the payload is missing,
    /// malformed, or does not fit the shape of `T`.
    pub fn load_value<T>(&self) -> Result<T, SettingsError>
    where
        T: DeserializeOwned,
    {
        let raw = self.value.as_deref().map_or("", RawValue::get);
        serde_json::from_str(raw).map_err(SettingsError::Deserialization)
    }

    /// Returns the raw serialized payload, if any.
    #[must_use]
    pub fn raw_value(&self) -> Option<&str> {
        self.value.as_deref().map(RawValue::get)
    }
}

impl PartialEq for Preference {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace
            && self.key == other.key
            && self.raw_value() == other.raw_value()
            && self.created == other.created
            && self.updated == other.updated
    }
}

impl Eq for Preference {}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.key)
    }
}
