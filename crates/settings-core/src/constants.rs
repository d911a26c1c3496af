//! Reserved identifiers.
//!
//! These names are control identifiers, not user data.

/// Namespace holding logical-to-physical namespace indirection preferences.
///
/// Each preference in this namespace is keyed by a logical namespace name and
/// holds the physical namespace name as a JSON string.
pub const NAMESPACE_SYSTEM: &str = "system";

/// Key under which a namespace's configuration payload is stored.
pub const KEY_CONFIGURATION: &str = "configuration";
