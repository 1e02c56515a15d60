//! rescache: reference-counted resource caching with release-driven eviction.
//!
//! A [`ResourceCache`] memoizes expensive values (compiled shader programs,
//! uploaded textures) by key and hands out shared [`ResourceHandle`]s. The
//! cache only observes its values; an entry is erased the moment the last
//! handle to it is dropped. On top of the cache, [`resource::ResourceLibrary`]
//! loads programs and textures by name from a [`store::ResourceStore`].
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod cache;
pub mod error;
pub mod handle;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod resource;
pub mod store;
pub mod traits;

pub use crate::builder::CacheBuilder;
pub use crate::cache::{LoadMode, ResourceCache};
pub use crate::error::{ConfigError, InvariantError, ResourceError, StoreError};
pub use crate::handle::ResourceHandle;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::CacheMetricsSnapshot;
pub use crate::traits::Loader;
