use std::path::{Path, PathBuf};

use crate::error::{ConfigError, StoreError};
use crate::store::path::normalize;
use crate::store::traits::ResourceStore;

/// Store that reads resources from files under a search root.
///
/// The normalized resource name is joined onto the root to form the file
/// path. Normalization rejects names that climb above the root, so reads
/// cannot escape it.
///
/// # Example
///
/// ```no_run
/// use rescache::store::{FileSystemStore, ResourceStore};
///
/// let store = FileSystemStore::open("./resources")?;
/// // Reads ./resources/shaders/basic.prog
/// let bytes = store.read("shaders/basic.prog")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    /// Create a store rooted at `root`.
    ///
    /// The directory does not need to exist yet. It is checked at read time.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store rooted at `root`, checking that it is a directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `root` does not exist or is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ConfigError::new(format!(
                "resource root {} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(normalize(path)?))
    }
}

impl ResourceStore for FileSystemStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let full_path = self.resolve(path)?;
        log::trace!("reading {}", full_path.display());
        std::fs::read(&full_path).map_err(|err| StoreError::from_io(path, err))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|full_path| full_path.is_file())
    }
}
