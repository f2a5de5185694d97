//! Instance cache implementation.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard};

/// Cache key for one adapter configuration.
///
/// The credential is never stored; only a hash of it is kept so that two
/// callers with different credentials get different instances.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    provider: String,
    model: String,
    variant: String,
    credential_fingerprint: u64,
}

impl ConfigKey {
    /// Key for a provider, model, variant (e.g. modality) and credential.
    ///
    /// # Examples
    ///
    /// ```
    /// use cineforge_cache::ConfigKey;
    ///
    /// let a = ConfigKey::new("openrouter", "openai/gpt-4o", "text", "sk-1");
    /// let b = ConfigKey::new("openrouter", "openai/gpt-4o", "text", "sk-2");
    /// assert_ne!(a, b);
    /// assert!(!format!("{:?}", a).contains("sk-1"));
    /// ```
    pub fn new(provider: &str, model: &str, variant: &str, credential: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        credential.hash(&mut hasher);
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            variant: variant.to_string(),
            credential_fingerprint: hasher.finish(),
        }
    }

    /// Provider family.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigKey({}/{}/{}#{:x})",
            self.provider, self.model, self.variant, self.credential_fingerprint
        )
    }
}

/// Configuration for the instance cache.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct InstanceCacheConfig {
    /// Maximum number of cached instances
    #[serde(default = "default_max_size")]
    #[builder(default = "default_max_size()")]
    max_size: usize,

    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    #[builder(default = "default_enabled()")]
    enabled: bool,
}

fn default_max_size() -> usize {
    32
}

fn default_enabled() -> bool {
    true
}

impl Default for InstanceCacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            enabled: default_enabled(),
        }
    }
}

struct Entries<V> {
    values: HashMap<ConfigKey, V>,
    access_order: Vec<ConfigKey>,
}

impl<V> Entries<V> {
    fn touch(&mut self, key: &ConfigKey) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            let key = self.access_order.remove(pos);
            self.access_order.push(key);
        }
    }

    fn forget(&mut self, key: &ConfigKey) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
    }

    fn evict_lru(&mut self) {
        if !self.access_order.is_empty() {
            let key = self.access_order.remove(0);
            tracing::debug!(key = ?key, "Evicting LRU instance");
            self.values.remove(&key);
        }
    }
}

/// Least-recently-used cache of shareable instances.
///
/// Values are cloned out on every hit, so `V` is normally an `Arc`. All
/// methods take `&self`; the cache may be shared across concurrent requests.
///
/// # Example
///
/// ```
/// use cineforge_cache::{ConfigKey, InstanceCache, InstanceCacheConfig};
/// use std::sync::Arc;
///
/// let cache: InstanceCache<Arc<String>> = InstanceCache::new(InstanceCacheConfig::default());
/// let key = ConfigKey::new("openrouter", "openai/gpt-4o", "text", "sk-1");
///
/// let first = cache
///     .get_or_try_insert_with(key.clone(), || Ok::<_, ()>(Arc::new("client".to_string())))
///     .unwrap();
/// let second = cache
///     .get_or_try_insert_with(key, || Ok::<_, ()>(Arc::new("other".to_string())))
///     .unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
///
/// cache.clear();
/// assert!(cache.is_empty());
/// ```
pub struct InstanceCache<V> {
    config: InstanceCacheConfig,
    entries: Mutex<Entries<V>>,
}

impl<V: Clone> InstanceCache<V> {
    /// Create a new instance cache with configuration.
    pub fn new(config: InstanceCacheConfig) -> Self {
        tracing::debug!(
            max_size = config.max_size,
            enabled = config.enabled,
            "Creating new InstanceCache"
        );
        Self {
            config,
            entries: Mutex::new(Entries {
                values: HashMap::new(),
                access_order: Vec::new(),
            }),
        }
    }

    /// Cache configuration.
    pub fn config(&self) -> &InstanceCacheConfig {
        &self.config
    }

    // A panic while holding the lock cannot leave the map half-updated in a
    // way that matters for a cache, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Entries<V>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get a cached instance, marking it most recently used.
    #[tracing::instrument(skip(self))]
    pub fn get(&self, key: &ConfigKey) -> Option<V> {
        if !self.config.enabled {
            return None;
        }
        let mut entries = self.lock();
        let value = entries.values.get(key).cloned()?;
        entries.touch(key);
        tracing::debug!("Cache hit");
        Some(value)
    }

    /// Insert an instance, evicting the least recently used one when full.
    #[tracing::instrument(skip(self, value))]
    pub fn insert(&self, key: ConfigKey, value: V) {
        if !self.config.enabled {
            tracing::debug!("Cache disabled, skipping insert");
            return;
        }
        let mut entries = self.lock();
        if entries.values.len() >= self.config.max_size && !entries.values.contains_key(&key) {
            entries.evict_lru();
        }
        entries.forget(&key);
        entries.access_order.push(key.clone());
        entries.values.insert(key, value);
        tracing::debug!(cache_size = entries.values.len(), "Inserted instance into cache");
    }

    /// Return the cached instance for `key`, building and caching it on a miss.
    ///
    /// The builder runs while the cache lock is held, so concurrent misses on
    /// the same key construct only one instance.
    ///
    /// # Errors
    ///
    /// Propagates the builder's error; nothing is cached in that case.
    pub fn get_or_try_insert_with<E, F>(&self, key: ConfigKey, build: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if !self.config.enabled {
            return build();
        }
        let mut entries = self.lock();
        if let Some(value) = entries.values.get(&key).cloned() {
            entries.touch(&key);
            tracing::debug!(key = ?key, "Cache hit");
            return Ok(value);
        }
        let value = build()?;
        if entries.values.len() >= self.config.max_size {
            entries.evict_lru();
        }
        entries.access_order.push(key.clone());
        entries.values.insert(key.clone(), value.clone());
        tracing::debug!(key = ?key, cache_size = entries.values.len(), "Cache miss, instance built");
        Ok(value)
    }

    /// Remove one instance. Returns whether it was cached.
    pub fn remove(&self, key: &ConfigKey) -> bool {
        let mut entries = self.lock();
        entries.forget(key);
        entries.values.remove(key).is_some()
    }

    /// Drop every cached instance.
    pub fn clear(&self) {
        let mut entries = self.lock();
        let count = entries.values.len();
        entries.values.clear();
        entries.access_order.clear();
        tracing::info!(cleared = count, "Cleared instance cache");
    }

    /// Number of cached instances.
    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().values.is_empty()
    }
}

impl<V: Clone> Default for InstanceCache<V> {
    fn default() -> Self {
        Self::new(InstanceCacheConfig::default())
    }
}
