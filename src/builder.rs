//! Builder for [`ResourceCache`] instances.
//!
//! ## Example
//!
//! ```rust
//! use rescache::builder::CacheBuilder;
//! use rescache::cache::{LoadMode, ResourceCache};
//!
//! let cache: ResourceCache<String, usize, _> = CacheBuilder::new()
//!     .label("lengths")
//!     .load_mode(LoadMode::PerKey)
//!     .initial_capacity(64)
//!     .build(|key: &String| Ok::<_, ()>(key.len()));
//!
//! assert_eq!(cache.label(), "lengths");
//! assert_eq!(*cache.get("four").unwrap(), 4);
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use crate::cache::{LoadMode, ResourceCache};
use crate::error::ConfigError;
use crate::traits::Loader;

const DEFAULT_LABEL: &str = "resources";

/// Configures label, load mode, and initial map capacity of a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheBuilder {
    label: String,
    load_mode: LoadMode,
    initial_capacity: usize,
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBuilder {
    /// Create a builder for a serialized cache labelled `"resources"`.
    pub fn new() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            load_mode: LoadMode::default(),
            initial_capacity: 0,
        }
    }

    /// Name used in log lines and exported metrics.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn load_mode(mut self, load_mode: LoadMode) -> Self {
        self.load_mode = load_mode;
        self
    }

    /// Pre-sizes the entry map.
    pub fn initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Build the cache around `loader`.
    ///
    /// # Panics
    ///
    /// Panics if the label is empty or blank. Use [`try_build`](Self::try_build)
    /// for user-supplied configuration.
    pub fn build<K, V, L>(self, loader: L) -> ResourceCache<K, V, L>
    where
        K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        V: Send + Sync + 'static,
        L: Loader<K, V>,
    {
        match self.try_build(loader) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {err}"),
        }
    }

    /// Fallible variant of [`build`](Self::build).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the label is empty or blank.
    pub fn try_build<K, V, L>(self, loader: L) -> Result<ResourceCache<K, V, L>, ConfigError>
    where
        K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        V: Send + Sync + 'static,
        L: Loader<K, V>,
    {
        if self.label.trim().is_empty() {
            return Err(ConfigError::new("cache label must not be empty"));
        }
        Ok(ResourceCache::from_parts(
            loader,
            self.label,
            self.load_mode,
            self.initial_capacity,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(key: &String) -> Result<String, ()> {
        Ok(key.clone())
    }

    #[test]
    fn defaults_are_serialized_and_labelled() {
        let cache: ResourceCache<String, String, _> = CacheBuilder::new().build(identity);
        assert_eq!(cache.load_mode(), LoadMode::Serialized);
        assert_eq!(cache.label(), "resources");
        assert!(cache.is_empty());
    }

    #[test]
    fn options_are_applied() {
        let cache: ResourceCache<String, String, _> = CacheBuilder::new()
            .label("textures")
            .load_mode(LoadMode::PerKey)
            .initial_capacity(32)
            .build(identity);
        assert_eq!(cache.load_mode(), LoadMode::PerKey);
        assert_eq!(cache.label(), "textures");
    }

    #[test]
    fn blank_label_is_rejected() {
        let err = CacheBuilder::new()
            .label("  ")
            .try_build::<String, String, _>(identity)
            .unwrap_err();
        assert!(err.message().contains("label"));
    }

    #[test]
    #[should_panic(expected = "invalid cache configuration")]
    fn build_panics_on_blank_label() {
        let _cache: ResourceCache<String, String, _> =
            CacheBuilder::new().label("").build(identity);
    }
}
