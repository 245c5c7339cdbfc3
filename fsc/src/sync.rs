//! Recursive, concurrency-bounded upload and delete orchestrators.
//!
//! Upload fans out the file transfers of one local directory at a time and
//! joins them before moving on; delete removes a remote subtree bottom-up,
//! joining each level's file deletions before recursing into its
//! subdirectories, because a storage directory cannot be deleted while
//! non-empty.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinSet;

use fsc_sdk::{DirectoryRef, StorageClient};

use crate::error::{FscError, FscResult};
use crate::local_fs::LocalFs;
use crate::pager::PagedLister;

pub struct TreeSync {
    client: Arc<dyn StorageClient>,
    fs: Arc<dyn LocalFs>,
}

impl TreeSync {
    #[must_use]
    pub fn new(client: Arc<dyn StorageClient>, fs: Arc<dyn LocalFs>) -> Self {
        Self { client, fs }
    }

    /// Mirror the local tree under `local_root` into `dest`.
    ///
    /// Each local subdirectory's remote chain is created (idempotently)
    /// before any file beneath it is transferred; the uploads within one
    /// directory run concurrently and are joined before the walk proceeds.
    /// Existing remote files of the same name are overwritten,
    /// last-write-wins. A failed branch is logged and skipped without
    /// cancelling its siblings.
    pub async fn upload_tree(&self, local_root: &Path, dest: &DirectoryRef) -> FscResult<()> {
        let levels = self.fs.walk(local_root)?;

        for level in levels {
            let components = self.fs.relative_components(local_root, &level.dir);

            // Walk/create the matching remote chain before this
            // directory's files go up.
            let mut remote = dest.clone();
            let mut chain_ok = true;
            for component in &components {
                remote = remote.subdirectory(component);
                if let Err(e) = self.client.create_directory_if_not_exists(&remote).await {
                    tracing::warn!(dir = %remote.uri(), error = %e, "skipping subtree: directory creation failed");
                    chain_ok = false;
                    break;
                }
            }
            if !chain_ok {
                continue;
            }

            let mut uploads = JoinSet::new();
            for file in level.files {
                let name = match self.fs.base_name(&file) {
                    Ok(name) => name,
                    Err(e) => {
                        tracing::warn!(file = %file.display(), error = %e, "skipping file");
                        continue;
                    }
                };
                let client = Arc::clone(&self.client);
                let remote = remote.clone();
                uploads.spawn(async move {
                    client.upload_file(&remote, &name, &file).await.map(|()| file)
                });
            }

            // Join this directory's fan-out before touching siblings.
            while let Some(result) = uploads.join_next().await {
                match result? {
                    Ok(file) => println!("Uploaded {}", file.display()),
                    Err(e) => tracing::warn!(error = %e, "upload failed"),
                }
            }
        }

        Ok(())
    }

    /// Upload a single local file into `dest`, named `name` when given and
    /// after the local base name otherwise. Returns the remote name used.
    pub async fn upload_file(
        &self,
        local: &Path,
        dest: &DirectoryRef,
        name: Option<&str>,
    ) -> FscResult<String> {
        if !self.fs.exists(local) {
            return Err(FscError::local_path(format!(
                "{} does not exist",
                local.display()
            )));
        }
        let name = match name {
            Some(name) => name.to_string(),
            None => self.fs.base_name(local)?,
        };
        self.client.upload_file(dest, &name, local).await?;
        Ok(name)
    }

    /// Delete the file or directory called `name` inside `dir`.
    ///
    /// The file fast path wins when it exists; otherwise the name is
    /// treated as a subdirectory and the subtree is removed bottom-up.
    pub async fn delete(&self, dir: &DirectoryRef, name: &str) -> FscResult<()> {
        if self.client.delete_file_if_exists(dir, name).await? {
            return Ok(());
        }
        let target = dir.subdirectory(name);
        Self::delete_directory_recursive(Arc::clone(&self.client), target).await
    }

    /// Empty and delete `dir`: all files at this level concurrently, then
    /// all subdirectory subtrees concurrently, then the directory itself.
    /// Boxed because the recursion is async.
    fn delete_directory_recursive(
        client: Arc<dyn StorageClient>,
        dir: DirectoryRef,
    ) -> Pin<Box<dyn Future<Output = FscResult<()>> + Send>> {
        Box::pin(async move {
            let children = PagedLister::new(Arc::clone(&client)).list_children(&dir).await?;
            let (dirs, files): (Vec<_>, Vec<_>) =
                children.into_iter().partition(|c| c.kind.is_dir());

            let mut branch_failed = false;

            let mut file_deletes = JoinSet::new();
            for file in files {
                let client = Arc::clone(&client);
                let dir = dir.clone();
                file_deletes.spawn(async move {
                    client
                        .delete_file_if_exists(&dir, &file.name)
                        .await
                        .map(|_| ())
                });
            }
            while let Some(result) = file_deletes.join_next().await {
                if let Err(e) = result? {
                    tracing::warn!(dir = %dir.uri(), error = %e, "file deletion failed");
                    branch_failed = true;
                }
            }

            // Files at this level are gone before any subdirectory is
            // removed; each recursion empties its own subtree first.
            let mut dir_deletes = JoinSet::new();
            for sub in dirs {
                let client = Arc::clone(&client);
                let sub = dir.subdirectory(&sub.name);
                dir_deletes.spawn(Self::delete_directory_recursive(client, sub));
            }
            while let Some(result) = dir_deletes.join_next().await {
                if let Err(e) = result? {
                    tracing::warn!(dir = %dir.uri(), error = %e, "subdirectory deletion failed");
                    branch_failed = true;
                }
            }

            if branch_failed {
                return Err(FscError::Remote(format!(
                    "could not empty directory {}",
                    dir.uri()
                )));
            }

            client.delete_directory(&dir).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_fs::DiskFs;
    use fsc_sdk::{
        ChildEntry, MemoryClient, Page, ShareEntry, ShareRef, StorageError, StorageResult,
    };
    use std::fs;

    fn sync_over(client: &Arc<MemoryClient>) -> TreeSync {
        let dyn_client: Arc<dyn StorageClient> = Arc::clone(client) as Arc<dyn StorageClient>;
        TreeSync::new(dyn_client, Arc::new(DiskFs))
    }

    /// Backend that fails selected operations by name, for exercising the
    /// partial-failure paths.
    struct FaultyClient {
        inner: Arc<MemoryClient>,
        fail_upload: Option<&'static str>,
        fail_delete: Option<&'static str>,
        fail_create_dir: Option<&'static str>,
    }

    impl FaultyClient {
        fn over(inner: Arc<MemoryClient>) -> Self {
            Self {
                inner,
                fail_upload: None,
                fail_delete: None,
                fail_create_dir: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl StorageClient for FaultyClient {
        fn base_uri(&self) -> String {
            self.inner.base_uri()
        }

        fn share_ref(&self, name: &str) -> ShareRef {
            self.inner.share_ref(name)
        }

        async fn share_exists(&self, share: &ShareRef) -> StorageResult<bool> {
            self.inner.share_exists(share).await
        }

        async fn list_shares(&self, token: Option<&str>) -> StorageResult<Page<ShareEntry>> {
            self.inner.list_shares(token).await
        }

        async fn directory_exists(&self, dir: &DirectoryRef) -> StorageResult<bool> {
            self.inner.directory_exists(dir).await
        }

        async fn create_directory_if_not_exists(&self, dir: &DirectoryRef) -> StorageResult<()> {
            if self.fail_create_dir == Some(dir.path()) {
                return Err(StorageError::Timeout);
            }
            self.inner.create_directory_if_not_exists(dir).await
        }

        async fn list_children(
            &self,
            dir: &DirectoryRef,
            token: Option<&str>,
        ) -> StorageResult<Page<ChildEntry>> {
            self.inner.list_children(dir, token).await
        }

        async fn upload_file(
            &self,
            dir: &DirectoryRef,
            name: &str,
            local: &Path,
        ) -> StorageResult<()> {
            if self.fail_upload == Some(name) {
                return Err(StorageError::Timeout);
            }
            self.inner.upload_file(dir, name, local).await
        }

        async fn delete_file_if_exists(
            &self,
            dir: &DirectoryRef,
            name: &str,
        ) -> StorageResult<bool> {
            if self.fail_delete == Some(name) {
                return Err(StorageError::Timeout);
            }
            self.inner.delete_file_if_exists(dir, name).await
        }

        async fn delete_directory(&self, dir: &DirectoryRef) -> StorageResult<()> {
            self.inner.delete_directory(dir).await
        }
    }

    fn sync_over_faulty(client: FaultyClient) -> TreeSync {
        TreeSync::new(Arc::new(client) as Arc<dyn StorageClient>, Arc::new(DiskFs))
    }

    fn op_index(ops: &[String], needle: &str) -> usize {
        ops.iter()
            .position(|op| op == needle)
            .unwrap_or_else(|| panic!("op {needle} not in {ops:?}"))
    }

    #[tokio::test]
    async fn upload_tree_mirrors_local_layout() {
        let temp = tempfile::tempdir().expect("tempdir failed");
        let root = temp.path().join("a");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("x.txt"), b"one").unwrap();
        fs::write(root.join("sub").join("y.txt"), b"two").unwrap();

        let client = Arc::new(MemoryClient::new());
        client.add_share("s");
        let dest = client.share_ref("s").root_directory();

        sync_over(&client).upload_tree(&root, &dest).await.unwrap();

        assert_eq!(client.file_content("s", "x.txt").unwrap(), b"one");
        assert_eq!(client.file_content("s", "sub/y.txt").unwrap(), b"two");
        assert!(client.has_directory("s", "sub"));
    }

    #[tokio::test]
    async fn directories_are_created_before_files_beneath_them() {
        let temp = tempfile::tempdir().expect("tempdir failed");
        let root = temp.path().join("a");
        fs::create_dir_all(root.join("sub").join("deep")).unwrap();
        fs::write(root.join("sub").join("y.txt"), b"y").unwrap();
        fs::write(root.join("sub").join("deep").join("z.txt"), b"z").unwrap();

        let client = Arc::new(MemoryClient::new());
        client.add_share("s");
        let dest = client.share_ref("s").root_directory();

        sync_over(&client).upload_tree(&root, &dest).await.unwrap();

        let ops = client.ops();
        assert!(op_index(&ops, "create_dir s:sub") < op_index(&ops, "upload s:sub/y.txt"));
        assert!(
            op_index(&ops, "create_dir s:sub/deep") < op_index(&ops, "upload s:sub/deep/z.txt")
        );
        assert!(op_index(&ops, "create_dir s:sub") < op_index(&ops, "create_dir s:sub/deep"));
    }

    #[tokio::test]
    async fn upload_overwrites_existing_remote_file() {
        let temp = tempfile::tempdir().expect("tempdir failed");
        let local = temp.path().join("note.txt");
        fs::write(&local, b"new content").unwrap();

        let client = Arc::new(MemoryClient::new());
        client.insert_file("s", "note.txt", b"old content");
        let dest = client.share_ref("s").root_directory();

        let name = sync_over(&client)
            .upload_file(&local, &dest, None)
            .await
            .unwrap();

        assert_eq!(name, "note.txt");
        assert_eq!(client.file_content("s", "note.txt").unwrap(), b"new content");
    }

    #[tokio::test]
    async fn single_file_upload_honors_explicit_name() {
        let temp = tempfile::tempdir().expect("tempdir failed");
        let local = temp.path().join("draft.txt");
        fs::write(&local, b"v1").unwrap();

        let client = Arc::new(MemoryClient::new());
        client.add_share("s");
        let dest = client.share_ref("s").root_directory();

        let name = sync_over(&client)
            .upload_file(&local, &dest, Some("final.txt"))
            .await
            .unwrap();

        assert_eq!(name, "final.txt");
        assert!(client.file_content("s", "final.txt").is_some());
        assert!(client.file_content("s", "draft.txt").is_none());
    }

    #[tokio::test]
    async fn missing_local_file_is_a_local_path_error() {
        let client = Arc::new(MemoryClient::new());
        client.add_share("s");
        let dest = client.share_ref("s").root_directory();

        let err = sync_over(&client)
            .upload_file(Path::new("/no/such/file"), &dest, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FscError::LocalPath(_)));
    }

    #[tokio::test]
    async fn delete_file_fast_path_leaves_directory() {
        let client = Arc::new(MemoryClient::new());
        client.insert_file("s", "keep/gone.txt", b"x");
        let root = client.share_ref("s").root_directory();
        let keep = root.subdirectory("keep");

        sync_over(&client).delete(&keep, "gone.txt").await.unwrap();

        assert!(client.file_content("s", "keep/gone.txt").is_none());
        assert!(client.has_directory("s", "keep"));
    }

    #[tokio::test]
    async fn delete_removes_nested_tree_bottom_up() {
        let client = Arc::new(MemoryClient::new());
        client.insert_file("s", "top/a.txt", b"1");
        client.insert_file("s", "top/mid/b.txt", b"2");
        client.insert_file("s", "top/mid/leaf/c.txt", b"3");
        let root = client.share_ref("s").root_directory();

        sync_over(&client).delete(&root, "top").await.unwrap();

        assert!(!client.has_directory("s", "top"));
        assert!(client.file_content("s", "top/mid/leaf/c.txt").is_none());

        // Every level's files vanish before that directory, and every
        // subdirectory vanishes before its parent.
        let ops = client.ops();
        assert!(op_index(&ops, "delete_file s:top/a.txt") < op_index(&ops, "delete_dir s:top"));
        assert!(
            op_index(&ops, "delete_file s:top/mid/b.txt") < op_index(&ops, "delete_dir s:top/mid")
        );
        assert!(
            op_index(&ops, "delete_file s:top/mid/leaf/c.txt")
                < op_index(&ops, "delete_dir s:top/mid/leaf")
        );
        assert!(op_index(&ops, "delete_dir s:top/mid/leaf") < op_index(&ops, "delete_dir s:top/mid"));
        assert!(op_index(&ops, "delete_dir s:top/mid") < op_index(&ops, "delete_dir s:top"));
    }

    #[tokio::test]
    async fn delete_unknown_name_propagates_not_found() {
        let client = Arc::new(MemoryClient::new());
        client.add_share("s");
        let root = client.share_ref("s").root_directory();

        let err = sync_over(&client).delete(&root, "ghost").await.unwrap_err();
        assert!(matches!(err, FscError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_upload_does_not_cancel_sibling_uploads() {
        let temp = tempfile::tempdir().expect("tempdir failed");
        let root = temp.path().join("a");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("bad.txt"), b"b").unwrap();
        fs::write(root.join("good.txt"), b"g").unwrap();
        fs::write(root.join("sub").join("y.txt"), b"y").unwrap();

        let inner = Arc::new(MemoryClient::new());
        inner.add_share("s");
        let dest = inner.share_ref("s").root_directory();
        let mut faulty = FaultyClient::over(Arc::clone(&inner));
        faulty.fail_upload = Some("bad.txt");

        sync_over_faulty(faulty).upload_tree(&root, &dest).await.unwrap();

        assert!(inner.file_content("s", "bad.txt").is_none());
        assert_eq!(inner.file_content("s", "good.txt").unwrap(), b"g");
        assert_eq!(inner.file_content("s", "sub/y.txt").unwrap(), b"y");
    }

    #[tokio::test]
    async fn unreachable_remote_directory_skips_only_its_subtree() {
        let temp = tempfile::tempdir().expect("tempdir failed");
        let root = temp.path().join("a");
        fs::create_dir_all(root.join("doomed")).unwrap();
        fs::create_dir_all(root.join("fine")).unwrap();
        fs::write(root.join("doomed").join("x.txt"), b"x").unwrap();
        fs::write(root.join("fine").join("y.txt"), b"y").unwrap();

        let inner = Arc::new(MemoryClient::new());
        inner.add_share("s");
        let dest = inner.share_ref("s").root_directory();
        let mut faulty = FaultyClient::over(Arc::clone(&inner));
        faulty.fail_create_dir = Some("doomed");

        sync_over_faulty(faulty).upload_tree(&root, &dest).await.unwrap();

        assert_eq!(inner.file_content("s", "fine/y.txt").unwrap(), b"y");
        assert!(!inner.has_directory("s", "doomed"));
        assert!(inner.file_content("s", "doomed/x.txt").is_none());
    }

    #[tokio::test]
    async fn failed_file_delete_spares_siblings_but_keeps_the_parent() {
        let inner = Arc::new(MemoryClient::new());
        inner.insert_file("s", "top/bad.txt", b"1");
        inner.insert_file("s", "top/good.txt", b"2");
        inner.insert_file("s", "top/mid/c.txt", b"3");
        let root = inner.share_ref("s").root_directory();
        let mut faulty = FaultyClient::over(Arc::clone(&inner));
        faulty.fail_delete = Some("bad.txt");

        let err = sync_over_faulty(faulty).delete(&root, "top").await.unwrap_err();
        assert!(matches!(err, FscError::Remote(_)));

        // Siblings of the failed file still went away, the non-emptied
        // directory did not.
        assert!(inner.file_content("s", "top/good.txt").is_none());
        assert!(!inner.has_directory("s", "top/mid"));
        assert!(inner.file_content("s", "top/bad.txt").is_some());
        assert!(inner.has_directory("s", "top"));
        assert!(!inner.ops().iter().any(|op| op == "delete_dir s:top"));
    }
}
