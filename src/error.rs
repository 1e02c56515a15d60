//! Error types for the rescache library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when internal cache invariants are violated
//!   (debug-only `check_invariants` methods).
//! - [`ConfigError`]: Returned when configuration parameters are invalid
//!   (e.g. an empty cache label, a search root that is not a directory).
//! - [`StoreError`]: Raised by [`ResourceStore`](crate::store::ResourceStore)
//!   backends when a path cannot be resolved or read.
//! - [`ResourceError`]: The resource-facing error taxonomy. Distinguishes a
//!   resource that could not be located ([`ResourceError::NotFound`]) from one
//!   whose content failed to produce a value ([`ResourceError::Invalid`]).
//!
//! ## Example Usage
//!
//! ```
//! use rescache::error::ResourceError;
//!
//! let missing = ResourceError::not_found("shaders/basic.vert");
//! assert!(missing.is_not_found());
//! assert_eq!(missing.to_string(), "shaders/basic.vert");
//!
//! let broken = ResourceError::invalid("shaders/basic.prog", "link failed");
//! assert!(broken.is_invalid());
//! assert_eq!(broken.to_string(), "shaders/basic.prog (link failed)");
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`ResourceCache::check_invariants`](crate::cache::ResourceCache::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build)
/// and [`FileSystemStore::open`](crate::store::FileSystemStore::open).
///
/// # Example
///
/// ```
/// use rescache::builder::CacheBuilder;
///
/// let err = CacheBuilder::new()
///     .label("")
///     .try_build::<String, usize, _>(|key: &String| Ok::<_, std::io::Error>(key.len()))
///     .unwrap_err();
/// assert!(err.to_string().contains("label"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors raised by resource store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing is stored under the requested path.
    #[error("not found: {0}")]
    NotFound(String),
    /// The path is invalid (empty, or escapes the store root through `..`).
    #[error("invalid path: {0}")]
    InvalidPath(String),
    /// The backend failed while reading.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Converts an I/O error, folding `ErrorKind::NotFound` into [`StoreError::NotFound`].
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(path.to_owned())
        } else {
            StoreError::Io(err)
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceError
// ---------------------------------------------------------------------------

/// Resource-level error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The named resource could not be located or opened.
    #[error("{}", describe(name, source.as_ref().map(|e| e.to_string())))]
    NotFound {
        name: String,
        #[source]
        source: Option<StoreError>,
    },
    /// The resource was found but its content did not produce a valid value.
    #[error("{}", describe(name, Some(message.clone())))]
    Invalid {
        name: String,
        message: String,
        #[source]
        source: Option<Box<ResourceError>>,
    },
}

fn describe(name: &str, reason: Option<String>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => format!("{name} ({reason})"),
        _ => name.to_owned(),
    }
}

impl ResourceError {
    /// A `NotFound` without an underlying reason.
    pub fn not_found(name: impl Into<String>) -> Self {
        ResourceError::NotFound {
            name: name.into(),
            source: None,
        }
    }

    /// A `NotFound` carrying the store failure that caused it.
    pub fn not_found_with(name: impl Into<String>, source: StoreError) -> Self {
        ResourceError::NotFound {
            name: name.into(),
            source: Some(source),
        }
    }

    /// An `Invalid` carrying a diagnostic message.
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        ResourceError::Invalid {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// An `Invalid` wrapping the error that made the resource unusable.
    pub fn invalid_caused_by(
        name: impl Into<String>,
        message: impl Into<String>,
        cause: ResourceError,
    ) -> Self {
        ResourceError::Invalid {
            name: name.into(),
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Name of the resource the error refers to.
    pub fn name(&self) -> &str {
        match self {
            ResourceError::NotFound { name, .. } | ResourceError::Invalid { name, .. } => name,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound { .. })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ResourceError::Invalid { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
