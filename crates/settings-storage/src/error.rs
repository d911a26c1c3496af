//! Cache error types.
//!
//! Cache errors never leave this crate's decorating repositories: a miss
//! falls through to the inner repository and every other failure is logged
//! and dropped.

/// Errors returned by [`Cache`](crate::Cache) implementations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No entry is stored under the key.
    #[error("cache miss: {key}")]
    Miss { key: String },

    /// An entry could not be encoded or decoded.
    #[error("cache codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The cache backend failed.
    #[error("cache backend error: {message}")]
    Backend { message: String },
}

impl CacheError {
    /// Creates a new `Miss` error.
    #[must_use]
    pub fn miss(key: impl Into<String>) -> Self {
        Self::Miss { key: key.into() }
    }

    /// Creates a new `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a cache miss.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_predicates() {
        assert!(CacheError::miss("k").is_miss());
        assert!(!CacheError::backend("down").is_miss());
        assert_eq!(CacheError::miss("k").to_string(), "cache miss: k");
        assert_eq!(
            CacheError::backend("down").to_string(),
            "cache backend error: down"
        );
    }
}
