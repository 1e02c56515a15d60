//! Storage backends for named resources.
//!
//! A store maps normalized resource names (forward slashes, no leading slash,
//! no `.`/`..` segments) to bytes. The resource façade resolves every name
//! through [`normalize`](crate::store::path::normalize) before calling into a
//! store. The bundled stores normalize again, since they are also usable on
//! their own.

use crate::error::StoreError;

/// Synchronous, read-only access to resource bytes.
pub trait ResourceStore: Send + Sync + 'static {
    /// Read the entire contents of the resource at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    /// Check whether a resource exists at `path`.
    ///
    /// Invalid paths report `false`.
    fn exists(&self, path: &str) -> bool;
}

impl<S: ResourceStore + ?Sized> ResourceStore for Box<S> {
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        (**self).read(path)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }
}

impl<S: ResourceStore + ?Sized> ResourceStore for std::sync::Arc<S> {
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        (**self).read(path)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }
}
