#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use settings_config::LayeredConfigurer;
use settings_db_memory::{InMemoryCache, InMemoryNamespaceRepository, InMemoryPreferenceRepository};
use settings_service::{SettingsService, new_service};
use settings_storage::{Cache, CacheError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Billing {
    pub plan: String,
}

pub fn billing(plan: &str) -> Billing {
    Billing {
        plan: plan.to_string(),
    }
}

/// The full service stack over in-memory backends, with handles to the raw
/// repositories for lookups that bypass the cache.
pub struct Harness {
    pub service: SettingsService,
    pub namespaces: Arc<InMemoryNamespaceRepository>,
    pub preferences: Arc<InMemoryPreferenceRepository>,
    pub cache: Arc<InMemoryCache>,
}

pub fn harness(static_config: serde_json::Value) -> Harness {
    let namespaces = Arc::new(InMemoryNamespaceRepository::new());
    let preferences = Arc::new(InMemoryPreferenceRepository::new());
    let cache = Arc::new(InMemoryCache::new());
    let configurer = Arc::new(LayeredConfigurer::from_json(&static_config).unwrap());

    let service = new_service(
        namespaces.clone(),
        preferences.clone(),
        configurer,
        cache.clone(),
    );

    Harness {
        service,
        namespaces,
        preferences,
        cache,
    }
}

/// A cache whose every operation fails.
pub struct UnavailableCache;

#[async_trait]
impl Cache for UnavailableCache {
    async fn set(&self, _key: &str, _value: Vec<u8>, _tags: &[String]) -> Result<(), CacheError> {
        Err(CacheError::backend("connection refused"))
    }

    async fn get(&self, _key: &str) -> Result<Vec<u8>, CacheError> {
        Err(CacheError::backend("connection refused"))
    }

    async fn del_by_key(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::backend("connection refused"))
    }

    async fn del_by_tag(&self, _tag: &str) -> Result<(), CacheError> {
        Err(CacheError::backend("connection refused"))
    }

    fn backend_name(&self) -> &'static str {
        "unavailable"
    }
}
