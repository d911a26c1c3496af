//! Cache key and invalidation tag scheme.
//!
//! Reads are cached under a key, writes invalidate by tag. Both the
//! cache-decorating repositories and the configurer fallback seed through
//! these helpers so their entries stay interchangeable.

const PREFIX: &str = "settings";

/// Cache key for a namespace record.
pub fn namespace_key(name: &str) -> String {
    format!("{PREFIX}:ns:name:{name}")
}

/// Invalidation tag for a namespace record.
pub fn namespace_tag(name: &str) -> String {
    format!("{PREFIX}:ns:tag:{name}")
}

/// Cache key for a preference record.
pub fn preference_key(namespace: &str, key: &str) -> String {
    format!("{PREFIX}:pref:ns:key:{namespace}:{key}")
}

/// Invalidation tag for a preference record.
pub fn preference_tag(namespace: &str, key: &str) -> String {
    format!("{PREFIX}:pref:tag:{namespace}:{key}")
}
