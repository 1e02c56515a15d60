pub use crate::builder::CacheBuilder;
pub use crate::cache::{LoadMode, ResourceCache};
pub use crate::error::{ResourceError, StoreError};
pub use crate::handle::ResourceHandle;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::CacheMetricsSnapshot;
pub use crate::resource::{GraphicsBackend, LibraryConfig, ResourceLibrary, ShaderStage};
pub use crate::store::{FileSystemStore, MemoryStore, ResourceStore};
pub use crate::traits::Loader;
