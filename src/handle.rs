//! Reference-counted handles issued by [`ResourceCache`](crate::cache::ResourceCache).
//!
//! A [`ResourceHandle`] is shared ownership of one loaded value. Clones are
//! cheap (`Arc` increment) and all clones refer to the same instance. The
//! handle carries a release callback that runs exactly once, when the last
//! clone is dropped, and *before* the value itself is dropped. The cache uses
//! it to erase its (non-owning) map entry.
//!
//! ## Architecture
//!
//! ```text
//!   ResourceHandle ──┐
//!   ResourceHandle ──┼──► Arc<HandleInner { value, generation, release }>
//!   ResourceHandle ──┘                  ▲
//!                                       │ Weak (non-owning)
//!                          cache map ───┘
//!
//!   last clone dropped ──► HandleInner::drop ──► release(generation)
//!                                                  └─► cache erases key
//!                                                      (only if generation matches)
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

/// Callback invoked once with the handle's generation when the last clone drops.
pub(crate) type ReleaseFn = Box<dyn FnOnce(u64) + Send + Sync>;

pub(crate) struct HandleInner<V> {
    value: V,
    generation: u64,
    release: Option<ReleaseFn>,
}

impl<V> Drop for HandleInner<V> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.generation);
        }
    }
}

/// Shared, read-only handle to a cached value.
///
/// # Example
///
/// ```
/// use rescache::cache::ResourceCache;
/// use rescache::handle::ResourceHandle;
///
/// let cache: ResourceCache<String, String, _> =
///     ResourceCache::new(|key: &String| Ok::<_, ()>(key.to_uppercase()));
///
/// let a = cache.get("brick").unwrap();
/// let b = a.clone();
/// assert_eq!(&*a, "BRICK");
/// assert!(ResourceHandle::ptr_eq(&a, &b));
/// assert_eq!(ResourceHandle::strong_count(&a), 2);
/// ```
pub struct ResourceHandle<V> {
    inner: Arc<HandleInner<V>>,
}

impl<V> ResourceHandle<V> {
    pub(crate) fn new(value: V, generation: u64, release: ReleaseFn) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                value,
                generation,
                release: Some(release),
            }),
        }
    }

    /// Wraps a value that is not tracked by any cache.
    ///
    /// Dropping the last clone only drops the value.
    pub fn detached(value: V) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                value,
                generation: 0,
                release: None,
            }),
        }
    }

    pub(crate) fn downgrade(this: &Self) -> Weak<HandleInner<V>> {
        Arc::downgrade(&this.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<HandleInner<V>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Returns `true` if both handles refer to the same loaded instance.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    /// Number of live clones of this handle.
    #[inline]
    pub fn strong_count(this: &Self) -> usize {
        Arc::strong_count(&this.inner)
    }

    /// Load generation assigned by the issuing cache.
    ///
    /// Strictly increasing across loads within one cache, so a reload of the
    /// same key after full release always reports a larger generation.
    /// Detached handles report `0`.
    #[inline]
    pub fn generation(this: &Self) -> u64 {
        this.inner.generation
    }
}

impl<V> Clone for ResourceHandle<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Deref for ResourceHandle<V> {
    type Target = V;

    #[inline]
    fn deref(&self) -> &V {
        &self.inner.value
    }
}

impl<V> AsRef<V> for ResourceHandle<V> {
    #[inline]
    fn as_ref(&self) -> &V {
        &self.inner.value
    }
}

impl<V: fmt::Debug> fmt::Debug for ResourceHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("value", &self.inner.value)
            .field("generation", &self.inner.generation)
            .finish()
    }
}
