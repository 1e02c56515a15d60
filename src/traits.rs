//! Loader capability consumed by [`ResourceCache`](crate::cache::ResourceCache).
//!
//! A loader turns a key into a freshly constructed value. It may be expensive
//! and it may fail; the cache propagates the failure verbatim and keeps no
//! entry behind.
//!
//! ## Reentrancy
//!
//! The cache does not assume a loader is reentrant-safe with respect to the
//! cache itself. A loader must not call [`get`](crate::cache::ResourceCache::get)
//! on the cache that invoked it, and must not drop the last handle of a value
//! owned by that cache. With [`LoadMode::Serialized`](crate::cache::LoadMode)
//! both deadlock on the cache lock; with `LoadMode::PerKey` a call for the same
//! key waits on its own pending load.
//!
//! Loaders *are* assumed safe to call concurrently for different keys.
//!
//! ## Example Usage
//!
//! ```
//! use rescache::traits::Loader;
//!
//! struct Lengths;
//!
//! impl Loader<String, usize> for Lengths {
//!     type Error = std::convert::Infallible;
//!
//!     fn load(&self, key: &String) -> Result<usize, Self::Error> {
//!         Ok(key.len())
//!     }
//! }
//!
//! assert_eq!(Lengths.load(&"abc".to_string()), Ok(3));
//!
//! // Closures work too.
//! let parse = |key: &String| key.parse::<u32>();
//! assert_eq!(parse.load(&"42".to_string()), Ok(42));
//! ```

/// Produces a `V` for a key.
pub trait Loader<K: ?Sized, V> {
    /// Error returned when the value cannot be produced.
    type Error;

    /// Constructs the value for `key`.
    fn load(&self, key: &K) -> Result<V, Self::Error>;
}

impl<K, V, E, F> Loader<K, V> for F
where
    K: ?Sized,
    F: Fn(&K) -> Result<V, E>,
{
    type Error = E;

    #[inline]
    fn load(&self, key: &K) -> Result<V, E> {
        self(key)
    }
}
