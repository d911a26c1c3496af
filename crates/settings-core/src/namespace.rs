use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A named grouping of preferences.
///
/// Identity is the name. Saving a namespace that already exists is an
/// idempotent upsert: backends keep the original `created` timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Unique, non-empty name.
    pub name: String,
    /// When the namespace was first created.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

impl Namespace {
    /// Creates a namespace stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: OffsetDateTime::now_utc(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_display() {
        assert_eq!(Namespace::new("billing").to_string(), "billing");
    }

    #[test]
    fn test_namespace_serde() {
        let ns = Namespace::new("billing");
        let json = serde_json::to_string(&ns).unwrap();
        let back: Namespace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ns);
    }
}
