//! Content storage for Homebase.
//!
//! The [`Storage`] trait abstracts reading raw content files (frontmatter plus
//! markdown body) away from the filesystem so site logic can be tested in memory.
//!
//! - [`FsStorage`] reads from a content root on disk and refuses any path that
//!   would resolve outside of it
//! - [`MockStorage`] keeps files in memory (behind the `mock` feature)
//!
//! # Example
//!
//! ```ignore
//! use hb_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new("contents");
//! let raw = storage.read("docs/getting-started/index.mdx")?;
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
