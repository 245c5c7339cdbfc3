use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{ChildEntry, DirectoryRef, Page, ShareEntry, ShareRef};

/// Remote side of the console: a share-based storage account.
///
/// Directory and file references are value types; methods taking a ref do
/// not require the target to exist unless stated. Listings are paginated:
/// pass `None` for the first page, then the previous page's `next_token`
/// until it comes back `None`.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Primary URI of the account root (rendered in the prompt when no
    /// share is selected).
    fn base_uri(&self) -> String;

    /// Reference to a share by name. Purely local; no existence check.
    fn share_ref(&self, name: &str) -> ShareRef;

    async fn share_exists(&self, share: &ShareRef) -> StorageResult<bool>;

    async fn list_shares(&self, token: Option<&str>) -> StorageResult<Page<ShareEntry>>;

    async fn directory_exists(&self, dir: &DirectoryRef) -> StorageResult<bool>;

    async fn create_directory_if_not_exists(&self, dir: &DirectoryRef) -> StorageResult<()>;

    async fn list_children(
        &self,
        dir: &DirectoryRef,
        token: Option<&str>,
    ) -> StorageResult<Page<ChildEntry>>;

    /// Upload the full content of a local file as `name` under `dir`,
    /// overwriting any existing remote file of the same name.
    async fn upload_file(&self, dir: &DirectoryRef, name: &str, local: &Path)
        -> StorageResult<()>;

    /// Returns whether a file existed and was deleted.
    async fn delete_file_if_exists(&self, dir: &DirectoryRef, name: &str) -> StorageResult<bool>;

    /// Delete a directory, which must be empty.
    async fn delete_directory(&self, dir: &DirectoryRef) -> StorageResult<()>;
}

#[async_trait]
impl<C: StorageClient + ?Sized> StorageClient for Arc<C> {
    fn base_uri(&self) -> String {
        (**self).base_uri()
    }

    fn share_ref(&self, name: &str) -> ShareRef {
        (**self).share_ref(name)
    }

    async fn share_exists(&self, share: &ShareRef) -> StorageResult<bool> {
        (**self).share_exists(share).await
    }

    async fn list_shares(&self, token: Option<&str>) -> StorageResult<Page<ShareEntry>> {
        (**self).list_shares(token).await
    }

    async fn directory_exists(&self, dir: &DirectoryRef) -> StorageResult<bool> {
        (**self).directory_exists(dir).await
    }

    async fn create_directory_if_not_exists(&self, dir: &DirectoryRef) -> StorageResult<()> {
        (**self).create_directory_if_not_exists(dir).await
    }

    async fn list_children(
        &self,
        dir: &DirectoryRef,
        token: Option<&str>,
    ) -> StorageResult<Page<ChildEntry>> {
        (**self).list_children(dir, token).await
    }

    async fn upload_file(
        &self,
        dir: &DirectoryRef,
        name: &str,
        local: &Path,
    ) -> StorageResult<()> {
        (**self).upload_file(dir, name, local).await
    }

    async fn delete_file_if_exists(&self, dir: &DirectoryRef, name: &str) -> StorageResult<bool> {
        (**self).delete_file_if_exists(dir, name).await
    }

    async fn delete_directory(&self, dir: &DirectoryRef) -> StorageResult<()> {
        (**self).delete_directory(dir).await
    }
}
