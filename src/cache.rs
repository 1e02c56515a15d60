//! Keyed resource cache with release-on-drop eviction.
//!
//! [`ResourceCache`] memoizes expensive-to-construct values (compiled shader
//! programs, uploaded textures, ...) by key and hands them out as
//! [`ResourceHandle`]s. The cache never owns a value: it keeps a *weak*
//! observation per key, and the value lives exactly as long as some consumer
//! holds a handle. When the last handle is dropped, its release callback
//! erases the key from the map synchronously.
//!
//! ## Architecture
//!
//! ```text
//!   get(key)
//!      │
//!      ▼
//!   ┌───────────────────────── Mutex<FxHashMap<K, Slot<V>>> ─────────────────────────┐
//!   │                                                                                │
//!   │  Slot::Ready { generation, Weak } ── upgrade ok ──► hit: clone handle          │
//!   │                                  └─ upgrade fails (expiring) ─┐                │
//!   │  Slot::Pending(PendingLoad)      ── PerKey only: wait, retry  │                │
//!   │  (absent) ────────────────────────────────────────────────────┤                │
//!   │                                                               ▼                │
//!   │                                              Loader::load(key) ──► Err: remove │
//!   │                                                   │                 slot, fail │
//!   │                                                   ▼ Ok(value)                  │
//!   │                          ResourceHandle { value, generation, release }         │
//!   │                          map[key] = Ready { generation, Weak(handle) }         │
//!   └────────────────────────────────────────────────────────────────────────────────┘
//!
//!   last handle dropped ──► release(generation)
//!                             └─► lock map; erase key iff map[key] is Ready with
//!                                 the same generation (a newer load wins)
//! ```
//!
//! ## Load Modes
//!
//! | Mode                     | Loader runs               | Concurrent loads of distinct keys |
//! |--------------------------|---------------------------|-----------------------------------|
//! | [`LoadMode::Serialized`] | with the map lock held    | no (all loads serialized)         |
//! | [`LoadMode::PerKey`]     | after publishing a pending slot, lock released | yes      |
//!
//! Both modes invoke the loader at most once per key at a time, and keep at
//! most one reachable value per key. `Serialized` is the simpler design and the
//! default; it trades throughput for trivially serialized loads. `PerKey` lets
//! independent keys load in parallel: a `get` that finds a pending slot waits
//! for it and then looks the key up again.
//!
//! ## Guarantees
//!
//! - **Identity sharing**: while any handle for `k` is alive, `get(k)` returns
//!   a handle to the same instance ([`ResourceHandle::ptr_eq`]).
//! - **Release-on-drop**: once every handle for `k` is dropped the entry is
//!   gone; the next `get(k)` calls the loader again.
//! - **No cached failure**: a failed load returns the loader's error verbatim
//!   and leaves no entry; the next `get(k)` retries.
//! - **Stale release guard**: a release callback of an older generation never
//!   erases an entry installed by a newer load of the same key.
//!
//! ## Teardown Contract
//!
//! Handles reference the cache's shared state for their release callback, so
//! the cache must outlive every handle it issued. Dropping a cache with live
//! entries logs an error and, in debug builds, fails an assertion. The shared
//! state itself is reference-counted, so a late release stays memory-safe in
//! release builds.
//!
//! The check counts map entries, not live handles. If another thread is inside
//! the last handle's release (strong count already zero, key not yet erased)
//! when the cache drops, the entry is still counted and the assertion fires
//! although no handle is alive. Join or otherwise synchronize with threads
//! that drop handles before dropping the cache.
//!
//! ## Example Usage
//!
//! ```
//! use rescache::cache::ResourceCache;
//! use rescache::handle::ResourceHandle;
//!
//! let cache: ResourceCache<String, String, _> =
//!     ResourceCache::new(|path: &String| Ok::<_, String>(format!("compiled {path}")));
//!
//! let a = cache.get("shaders/basic.prog").unwrap();
//! let b = cache.get("shaders/basic.prog").unwrap();
//! assert!(ResourceHandle::ptr_eq(&a, &b));
//! assert_eq!(cache.len(), 1);
//!
//! drop(a);
//! drop(b);
//! assert!(cache.is_empty());
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use crate::builder::CacheBuilder;
use crate::error::InvariantError;
use crate::handle::{HandleInner, ResourceHandle};
#[cfg(feature = "metrics")]
use crate::metrics::{
    CacheMetrics, CacheMetricsRecorder, CacheMetricsSnapshot, MetricsReset,
    MetricsSnapshotProvider,
};
use crate::traits::Loader;

/// How a cache runs its loader relative to the map lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadMode {
    /// Loader runs while the cache-wide lock is held.
    #[default]
    Serialized,
    /// Loader runs unlocked behind a per-key pending slot.
    PerKey,
}

enum Slot<V> {
    Ready {
        generation: u64,
        value: Weak<HandleInner<V>>,
    },
    Pending(Arc<PendingLoad>),
}

enum Lookup<V> {
    Hit(ResourceHandle<V>),
    Pending(Arc<PendingLoad>),
    Miss,
}

/// Completion signal for an in-flight `PerKey` load.
struct PendingLoad {
    done: Mutex<bool>,
    cond: Condvar,
}

impl PendingLoad {
    fn new() -> Self {
        Self {
            done: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    fn wait(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.cond.wait(&mut done);
        }
    }

    fn complete(&self) {
        *self.done.lock() = true;
        self.cond.notify_all();
    }
}

/// State shared between the cache and the release callbacks of its handles.
struct CacheShared<K, V> {
    label: String,
    entries: Mutex<FxHashMap<K, Slot<V>>>,
    next_generation: AtomicU64,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> CacheShared<K, V>
where
    K: Eq + Hash + fmt::Debug,
{
    fn release(&self, key: &K, generation: u64) {
        let mut entries = self.entries.lock();
        let current = matches!(
            entries.get(key),
            Some(Slot::Ready { generation: live, .. }) if *live == generation
        );
        if current {
            entries.remove(key);
        }
        drop(entries);

        if current {
            log::trace!("[{}] released {:?} (generation {})", self.label, key, generation);
            #[cfg(feature = "metrics")]
            self.metrics.record_release();
        } else {
            log::trace!(
                "[{}] stale release of {:?} (generation {}) ignored",
                self.label,
                key,
                generation
            );
            #[cfg(feature = "metrics")]
            self.metrics.record_stale_release();
        }
    }
}

/// Holds a published pending slot until the load resolves.
///
/// Dropping an unfulfilled claim (load failed or panicked) removes the slot.
/// Either way the waiters are woken.
struct PendingClaim<'a, K, V>
where
    K: Eq + Hash,
{
    entries: &'a Mutex<FxHashMap<K, Slot<V>>>,
    key: Option<K>,
    pending: Arc<PendingLoad>,
}

impl<K, V> PendingClaim<'_, K, V>
where
    K: Eq + Hash,
{
    fn fulfil(mut self, generation: u64, value: Weak<HandleInner<V>>) {
        if let Some(key) = self.key.take() {
            self.entries
                .lock()
                .insert(key, Slot::Ready { generation, value });
        }
    }
}

impl<K, V> Drop for PendingClaim<'_, K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            let mut entries = self.entries.lock();
            let ours = matches!(
                entries.get(&key),
                Some(Slot::Pending(pending)) if Arc::ptr_eq(pending, &self.pending)
            );
            if ours {
                entries.remove(&key);
            }
        }
        self.pending.complete();
    }
}

/// Memoizing cache of loaded values, keyed by `K`.
///
/// See the [module documentation](self) for the full contract.
pub struct ResourceCache<K, V, L> {
    shared: Arc<CacheShared<K, V>>,
    loader: L,
    mode: LoadMode,
}

impl<K, V, L> ResourceCache<K, V, L>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
    L: Loader<K, V>,
{
    /// Creates a serialized cache around `loader`.
    pub fn new(loader: L) -> Self {
        CacheBuilder::new().build(loader)
    }

    /// Returns a [`CacheBuilder`] for label, load mode, and map capacity.
    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }

    pub(crate) fn from_parts(loader: L, label: String, mode: LoadMode, capacity: usize) -> Self {
        Self {
            shared: Arc::new(CacheShared {
                label,
                entries: Mutex::new(FxHashMap::with_capacity_and_hasher(
                    capacity,
                    Default::default(),
                )),
                next_generation: AtomicU64::new(1),
                #[cfg(feature = "metrics")]
                metrics: CacheMetrics::default(),
            }),
            loader,
            mode,
        }
    }

    /// Returns a handle to the value for `key`, loading it if no live value exists.
    ///
    /// # Errors
    ///
    /// Returns the loader's error unchanged. No entry for `key` remains after a
    /// failed load.
    ///
    /// # Example
    ///
    /// ```
    /// use rescache::cache::ResourceCache;
    ///
    /// let cache: ResourceCache<String, u32, _> = ResourceCache::new(|key: &String| key.parse::<u32>());
    ///
    /// assert_eq!(*cache.get("7").unwrap(), 7);
    /// assert!(cache.get("seven").is_err());
    /// assert!(!cache.contains("seven"));
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Result<ResourceHandle<V>, L::Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.shared.metrics.record_get_call();

        match self.mode {
            LoadMode::Serialized => self.get_serialized(key),
            LoadMode::PerKey => self.get_per_key(key),
        }
    }

    fn get_serialized<Q>(&self, key: &Q) -> Result<ResourceHandle<V>, L::Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let mut entries = self.shared.entries.lock();
        if let Lookup::Hit(handle) = Self::lookup(&entries, key) {
            drop(entries);
            #[cfg(feature = "metrics")]
            self.shared.metrics.record_get_hit();
            return Ok(handle);
        }

        #[cfg(feature = "metrics")]
        self.shared.metrics.record_get_miss();

        let owned = key.to_owned();
        log::debug!("[{}] loading {:?}", self.shared.label, owned);
        match self.loader.load(&owned) {
            Ok(value) => {
                let handle = self.issue(owned.clone(), value);
                entries.insert(
                    owned,
                    Slot::Ready {
                        generation: ResourceHandle::generation(&handle),
                        value: ResourceHandle::downgrade(&handle),
                    },
                );
                drop(entries);
                #[cfg(feature = "metrics")]
                self.shared.metrics.record_load();
                Ok(handle)
            },
            Err(err) => {
                // an expiring entry may still be present
                entries.remove(key);
                drop(entries);
                self.note_failure(&owned);
                Err(err)
            },
        }
    }

    fn get_per_key<Q>(&self, key: &Q) -> Result<ResourceHandle<V>, L::Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let (owned, claim) = loop {
            let mut entries = self.shared.entries.lock();
            match Self::lookup(&entries, key) {
                Lookup::Hit(handle) => {
                    drop(entries);
                    #[cfg(feature = "metrics")]
                    self.shared.metrics.record_get_hit();
                    return Ok(handle);
                },
                Lookup::Pending(pending) => {
                    drop(entries);
                    #[cfg(feature = "metrics")]
                    self.shared.metrics.record_load_wait();
                    pending.wait();
                },
                Lookup::Miss => {
                    let owned = key.to_owned();
                    let pending = Arc::new(PendingLoad::new());
                    entries.insert(owned.clone(), Slot::Pending(Arc::clone(&pending)));
                    let claim = PendingClaim {
                        entries: &self.shared.entries,
                        key: Some(owned.clone()),
                        pending,
                    };
                    break (owned, claim);
                },
            }
        };

        #[cfg(feature = "metrics")]
        self.shared.metrics.record_get_miss();

        log::debug!("[{}] loading {:?}", self.shared.label, owned);
        match self.loader.load(&owned) {
            Ok(value) => {
                let handle = self.issue(owned, value);
                claim.fulfil(
                    ResourceHandle::generation(&handle),
                    ResourceHandle::downgrade(&handle),
                );
                #[cfg(feature = "metrics")]
                self.shared.metrics.record_load();
                Ok(handle)
            },
            Err(err) => {
                drop(claim);
                self.note_failure(&owned);
                Err(err)
            },
        }
    }

    fn lookup<Q>(entries: &FxHashMap<K, Slot<V>>, key: &Q) -> Lookup<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match entries.get(key) {
            Some(Slot::Ready { value, .. }) => match ResourceHandle::upgrade(value) {
                Some(handle) => Lookup::Hit(handle),
                // last handle is mid-release; treat as absent
                None => Lookup::Miss,
            },
            Some(Slot::Pending(pending)) => Lookup::Pending(Arc::clone(pending)),
            None => Lookup::Miss,
        }
    }

    /// Wraps a freshly loaded value in a handle whose release erases `key`.
    fn issue(&self, key: K, value: V) -> ResourceHandle<V> {
        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            "[{}] insert {:?} (generation {})",
            self.shared.label,
            key,
            generation
        );
        let shared = Arc::clone(&self.shared);
        ResourceHandle::new(
            value,
            generation,
            Box::new(move |generation| shared.release(&key, generation)),
        )
    }

    fn note_failure(&self, key: &K) {
        log::warn!("[{}] failed to load {:?}", self.shared.label, key);
        #[cfg(feature = "metrics")]
        self.shared.metrics.record_load_failure();
    }

    /// Returns `true` if a live value is cached for `key`.
    ///
    /// Does not load and does not update metrics.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        matches!(
            self.shared.entries.lock().get(key),
            Some(Slot::Ready { value, .. }) if value.strong_count() > 0
        )
    }

    /// Checks the structural invariants of the map.
    ///
    /// - a serialized cache never holds pending slots
    /// - every ready entry carries a generation that has already been issued
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        // PerKey issues generations outside the lock; read the counter after
        // taking it so every inserted generation is below `next`.
        let entries = self.shared.entries.lock();
        let next = self.shared.next_generation.load(Ordering::Relaxed);
        for (key, slot) in entries.iter() {
            match slot {
                Slot::Pending(_) if self.mode == LoadMode::Serialized => {
                    return Err(InvariantError::new(format!(
                        "pending slot for {key:?} in a serialized cache"
                    )));
                },
                Slot::Ready { generation, .. } if *generation == 0 || *generation >= next => {
                    return Err(InvariantError::new(format!(
                        "entry {key:?} has unissued generation {generation} (next {next})"
                    )));
                },
                _ => {},
            }
        }
        Ok(())
    }

    /// Snapshot of the cache's counters plus the current entry count.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.shared.metrics.snapshot(self.len())
    }
}

impl<K, V, L> ResourceCache<K, V, L> {
    /// Number of keys present in the map.
    ///
    /// Counts pending loads (`PerKey`) and entries whose last handle is being
    /// released at this moment.
    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label used in log lines and metrics.
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    pub fn load_mode(&self) -> LoadMode {
        self.mode
    }

    /// The loader this cache was built with.
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

#[cfg(feature = "metrics")]
impl<K, V, L> MetricsSnapshotProvider<CacheMetricsSnapshot> for ResourceCache<K, V, L>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
    L: Loader<K, V>,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V, L> MetricsReset for ResourceCache<K, V, L> {
    fn reset_metrics(&self) {
        self.shared.metrics.reset_metrics();
    }
}

impl<K, V, L> fmt::Debug for ResourceCache<K, V, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("label", &self.shared.label)
            .field("mode", &self.mode)
            .field("len", &self.len())
            .finish()
    }
}

impl<K, V, L> Drop for ResourceCache<K, V, L> {
    fn drop(&mut self) {
        let live = self.shared.entries.lock().len();
        if live == 0 {
            return;
        }
        log::error!(
            "[{}] resource cache dropped with {} live entries; handles must not outlive their cache",
            self.shared.label,
            live
        );
        debug_assert!(
            std::thread::panicking(),
            "resource cache `{}` dropped while {} handle(s) it issued are still alive",
            self.shared.label,
            live
        );
    }
}
