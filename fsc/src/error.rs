//! Error types for fsc

use fsc_sdk::StorageError;
use thiserror::Error;

/// Result type alias for fsc operations
pub type FscResult<T> = Result<T, FscError>;

/// Error types for console operations
#[derive(Error, Debug)]
pub enum FscError {
    /// Missing or malformed command arguments
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Share-scoped command issued with no share selected
    #[error("not in a share")]
    NotInShare,

    /// Share or directory name does not exist remotely
    #[error("not found: {0}")]
    NotFound(String),

    /// Local path missing or unreadable
    #[error("local path error: {0}")]
    LocalPath(String),

    /// Transport/auth/quota failure surfaced by the storage client
    #[error("remote error: {0}")]
    Remote(String),

    /// A fan-out worker panicked or was aborted
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl FscError {
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    #[must_use]
    pub fn local_path(reason: impl Into<String>) -> Self {
        Self::LocalPath(reason.into())
    }
}

impl From<StorageError> for FscError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::NotFound(what),
            StorageError::InvalidArgument(reason) => Self::InvalidArgument(reason),
            other => Self::Remote(other.to_string()),
        }
    }
}
