use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::StoreError;
use crate::store::path::normalize;
use crate::store::traits::ResourceStore;

/// In-memory store for tests and embedded assets.
///
/// Clones share the same contents, so a store handed to a
/// [`ResourceLibrary`](crate::resource::ResourceLibrary) can still be filled
/// afterwards.
///
/// # Example
///
/// ```
/// use rescache::store::{MemoryStore, ResourceStore};
///
/// let store = MemoryStore::new();
/// store.insert("shaders/basic.vert", b"void main() {}".to_vec());
/// assert!(store.exists("/shaders/basic.vert"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: Arc<RwLock<FxHashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, overwriting any previous content.
    ///
    /// The name is normalized first; names that do not normalize are ignored
    /// and reported with `false`.
    pub fn insert(&self, path: &str, data: impl Into<Vec<u8>>) -> bool {
        match normalize(path) {
            Ok(path) => {
                self.files.write().insert(path, data.into());
                true
            },
            Err(err) => {
                log::warn!("memory store: ignoring insert: {err}");
                false
            },
        }
    }

    /// Remove a resource, returning its data if it existed.
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        let path = normalize(path).ok()?;
        self.files.write().remove(&path)
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl ResourceStore for MemoryStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let normalized = normalize(path)?;
        self.files
            .read()
            .get(&normalized)
            .cloned()
            .ok_or(StoreError::NotFound(normalized))
    }

    fn exists(&self, path: &str) -> bool {
        normalize(path).is_ok_and(|path| self.files.read().contains_key(&path))
    }
}
