//! FSC SDK - core types and the `StorageClient` trait.
//!
//! A storage account exposes a flat set of named *shares*; each share holds
//! a tree of directories and files. Listings are paginated behind opaque
//! continuation tokens. Implementations of [`StorageClient`] provide the
//! remote side; [`MemoryClient`] is an in-process reference backend used by
//! the test suites.

mod client;
mod error;
mod memory;
mod types;

pub use client::StorageClient;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryClient;
pub use types::{ChildEntry, DirectoryRef, EntryKind, Page, ShareEntry, ShareRef};
