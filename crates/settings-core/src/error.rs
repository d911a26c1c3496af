//! Error types for the settings store.
//!
//! Every layer returns [`SettingsError`]. Layers that add identifying context
//! wrap the inner error with [`SettingsError::context`], which keeps the
//! original [`ErrorKind`] visible to callers.

use std::fmt;

/// Errors that can occur while resolving, loading or storing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The requested namespace or preference does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What was looked up (`namespace` or `preference`).
        entity: &'static str,
        /// Identity of the missing record.
        id: String,
    },

    /// A value could not be encoded into a preference payload.
    #[error("failed to serialize value: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A preference payload could not be decoded into the requested shape.
    #[error("failed to deserialize value: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The persistence backend failed.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the backend failure.
        message: String,
    },

    /// The static configuration source failed.
    #[error("configurer error: {source}")]
    Configurer {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An inner error with identifying context attached.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<SettingsError>,
    },
}

impl SettingsError {
    /// Creates a `NotFound` error for a namespace.
    #[must_use]
    pub fn namespace_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "namespace",
            id: name.into(),
        }
    }

    /// Creates a `NotFound` error for a preference.
    #[must_use]
    pub fn preference_not_found(namespace: &str, key: &str) -> Self {
        Self::NotFound {
            entity: "preference",
            id: format!("{namespace}.{key}"),
        }
    }

    /// Creates a `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a `Configurer` error from any source error.
    #[must_use]
    pub fn configurer(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Configurer {
            source: Box::new(source),
        }
    }

    /// Wraps this error with identifying context. The kind is unchanged.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the kind of this error, looking through any context layers.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Deserialization(_) => ErrorKind::Deserialization,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Configurer { .. } => ErrorKind::Configurer,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Returns `true` if this is, or wraps, a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Kinds of settings errors, stable across context wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Namespace or preference not found.
    NotFound,
    /// Payload encoding failure.
    Serialization,
    /// Payload decoding failure.
    Deserialization,
    /// Persistence backend failure.
    Storage,
    /// Static configuration source failure.
    Configurer,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Serialization => write!(f, "serialization"),
            Self::Deserialization => write!(f, "deserialization"),
            Self::Storage => write!(f, "storage"),
            Self::Configurer => write!(f, "configurer"),
        }
    }
}
