//! fsc - Interactive console for share-based remote storage
//!
//! This crate provides:
//! - A navigation state machine over shares and directories ([`namespace`])
//! - Paginated listing drains ([`pager`])
//! - Concurrent upload/delete tree synchronization ([`sync`])
//! - The command lifecycle and read-eval-print shell ([`command`], [`shell`])

pub mod command;
pub mod error;
pub mod local_fs;
pub mod namespace;
pub mod pager;
pub mod path_util;
pub mod shell;
pub mod sync;

pub use command::Command;
pub use error::{FscError, FscResult};
pub use local_fs::{DiskFs, LocalFs};
pub use namespace::RemoteNamespace;
pub use pager::PagedLister;
pub use shell::{LineOutcome, Shell};
pub use sync::TreeSync;
