//! Resource stores: where resource bytes come from.
//!
//! - [`FileSystemStore`]: files under a search root on disk.
//! - [`MemoryStore`]: in-memory map for tests and embedded assets.
//!
//! Custom backends (archives, network fetch) implement [`ResourceStore`].

pub mod filesystem;
pub mod memory;
pub mod path;
pub mod traits;

pub use filesystem::FileSystemStore;
pub use memory::MemoryStore;
pub use traits::ResourceStore;
