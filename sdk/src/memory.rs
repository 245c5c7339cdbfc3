use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::client::StorageClient;
use crate::error::{StorageError, StorageResult};
use crate::types::{ChildEntry, DirectoryRef, Page, ShareEntry, ShareRef};

#[derive(Debug, Default)]
struct MemShare {
    /// Relative directory paths; the empty string is the share root.
    dirs: BTreeSet<String>,
    /// Full relative file path -> content.
    files: BTreeMap<String, Vec<u8>>,
}

impl MemShare {
    fn new() -> Self {
        let mut dirs = BTreeSet::new();
        dirs.insert(String::new());
        Self {
            dirs,
            files: BTreeMap::new(),
        }
    }

    fn children_of(&self, dir_path: &str) -> Vec<ChildEntry> {
        let mut entries: Vec<ChildEntry> = self
            .dirs
            .iter()
            .filter(|p| !p.is_empty() && parent_of(p) == dir_path)
            .map(|p| ChildEntry::directory(last_component(p)))
            .chain(
                self.files
                    .keys()
                    .filter(|p| parent_of(p) == dir_path)
                    .map(|p| ChildEntry::file(last_component(p))),
            )
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(rest, _)| rest)
}

fn last_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn join(dir_path: &str, name: &str) -> String {
    if dir_path.is_empty() {
        name.to_string()
    } else {
        format!("{dir_path}/{name}")
    }
}

/// In-process [`StorageClient`] backend.
///
/// Keeps every mutation in an operation log so tests can assert ordering
/// (directory created before files uploaded into it, children deleted
/// before their directory).
pub struct MemoryClient {
    base_uri: String,
    page_size: usize,
    shares: RwLock<BTreeMap<String, MemShare>>,
    ops: Mutex<Vec<String>>,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_uri: "memory://account".to_string(),
            page_size: usize::MAX,
            shares: RwLock::new(BTreeMap::new()),
            ops: Mutex::new(Vec::new()),
        }
    }

    /// Cap listing pages at `n` entries so pagination paths get exercised.
    #[must_use]
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n.max(1);
        self
    }

    pub fn add_share(&self, name: &str) {
        self.shares
            .write()
            .unwrap()
            .insert(name.to_string(), MemShare::new());
    }

    /// Seed a file, creating parent directories implicitly.
    pub fn insert_file(&self, share: &str, path: &str, content: &[u8]) {
        let mut shares = self.shares.write().unwrap();
        let share = shares
            .entry(share.to_string())
            .or_insert_with(MemShare::new);
        let mut parent = parent_of(path).to_string();
        while !parent.is_empty() {
            share.dirs.insert(parent.clone());
            parent = parent_of(&parent).to_string();
        }
        share.files.insert(path.to_string(), content.to_vec());
    }

    #[must_use]
    pub fn file_content(&self, share: &str, path: &str) -> Option<Vec<u8>> {
        self.shares
            .read()
            .unwrap()
            .get(share)
            .and_then(|s| s.files.get(path).cloned())
    }

    #[must_use]
    pub fn has_directory(&self, share: &str, path: &str) -> bool {
        self.shares
            .read()
            .unwrap()
            .get(share)
            .is_some_and(|s| s.dirs.contains(path))
    }

    /// Mutation log, in call order: `create_dir`, `upload`, `delete_file`,
    /// `delete_dir` entries tagged `share:path`.
    #[must_use]
    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn log(&self, op: &str, share: &str, path: &str) {
        self.ops.lock().unwrap().push(format!("{op} {share}:{path}"));
    }

    fn page<T: Clone>(&self, all: &[T], token: Option<&str>) -> StorageResult<Page<T>> {
        let start = match token {
            None => 0,
            Some(t) => t
                .parse::<usize>()
                .map_err(|_| StorageError::invalid_argument(format!("bad continuation token: {t}")))?,
        };
        let end = start.saturating_add(self.page_size).min(all.len());
        let next_token = if end < all.len() {
            Some(end.to_string())
        } else {
            None
        };
        Ok(Page {
            entries: all[start..end].to_vec(),
            next_token,
        })
    }
}

#[async_trait]
impl StorageClient for MemoryClient {
    fn base_uri(&self) -> String {
        self.base_uri.clone()
    }

    fn share_ref(&self, name: &str) -> ShareRef {
        ShareRef::new(name, format!("{}/{}", self.base_uri, name))
    }

    async fn share_exists(&self, share: &ShareRef) -> StorageResult<bool> {
        Ok(self.shares.read().unwrap().contains_key(share.name()))
    }

    async fn list_shares(&self, token: Option<&str>) -> StorageResult<Page<ShareEntry>> {
        let all: Vec<ShareEntry> = self
            .shares
            .read()
            .unwrap()
            .keys()
            .map(|name| ShareEntry { name: name.clone() })
            .collect();
        self.page(&all, token)
    }

    async fn directory_exists(&self, dir: &DirectoryRef) -> StorageResult<bool> {
        Ok(self
            .shares
            .read()
            .unwrap()
            .get(dir.share())
            .is_some_and(|s| s.dirs.contains(dir.path())))
    }

    async fn create_directory_if_not_exists(&self, dir: &DirectoryRef) -> StorageResult<()> {
        let created = {
            let mut shares = self.shares.write().unwrap();
            let share = shares
                .get_mut(dir.share())
                .ok_or_else(|| StorageError::not_found(format!("share {}", dir.share())))?;
            let parent = parent_of(dir.path());
            if !dir.is_root() && !share.dirs.contains(parent) {
                return Err(StorageError::not_found(format!(
                    "parent directory {}:{parent}",
                    dir.share()
                )));
            }
            share.dirs.insert(dir.path().to_string())
        };
        if created {
            self.log("create_dir", dir.share(), dir.path());
        }
        Ok(())
    }

    async fn list_children(
        &self,
        dir: &DirectoryRef,
        token: Option<&str>,
    ) -> StorageResult<Page<ChildEntry>> {
        let all = {
            let shares = self.shares.read().unwrap();
            let share = shares
                .get(dir.share())
                .ok_or_else(|| StorageError::not_found(format!("share {}", dir.share())))?;
            if !share.dirs.contains(dir.path()) {
                return Err(StorageError::not_found(format!(
                    "directory {}:{}",
                    dir.share(),
                    dir.path()
                )));
            }
            share.children_of(dir.path())
        };
        self.page(&all, token)
    }

    async fn upload_file(
        &self,
        dir: &DirectoryRef,
        name: &str,
        local: &Path,
    ) -> StorageResult<()> {
        let content = tokio::fs::read(local)
            .await
            .map_err(|e| StorageError::internal(format!("read {}: {e}", local.display())))?;
        let path = join(dir.path(), name);
        {
            let mut shares = self.shares.write().unwrap();
            let share = shares
                .get_mut(dir.share())
                .ok_or_else(|| StorageError::not_found(format!("share {}", dir.share())))?;
            if !share.dirs.contains(dir.path()) {
                return Err(StorageError::not_found(format!(
                    "directory {}:{}",
                    dir.share(),
                    dir.path()
                )));
            }
            share.files.insert(path.clone(), content);
        }
        self.log("upload", dir.share(), &path);
        Ok(())
    }

    async fn delete_file_if_exists(&self, dir: &DirectoryRef, name: &str) -> StorageResult<bool> {
        let path = join(dir.path(), name);
        let removed = {
            let mut shares = self.shares.write().unwrap();
            let share = shares
                .get_mut(dir.share())
                .ok_or_else(|| StorageError::not_found(format!("share {}", dir.share())))?;
            share.files.remove(&path).is_some()
        };
        if removed {
            self.log("delete_file", dir.share(), &path);
        }
        Ok(removed)
    }

    async fn delete_directory(&self, dir: &DirectoryRef) -> StorageResult<()> {
        if dir.is_root() {
            return Err(StorageError::invalid_argument(
                "cannot delete a share root directory",
            ));
        }
        {
            let mut shares = self.shares.write().unwrap();
            let share = shares
                .get_mut(dir.share())
                .ok_or_else(|| StorageError::not_found(format!("share {}", dir.share())))?;
            if !share.dirs.contains(dir.path()) {
                return Err(StorageError::not_found(format!(
                    "directory {}:{}",
                    dir.share(),
                    dir.path()
                )));
            }
            let prefix = format!("{}/", dir.path());
            let has_child_dir = share.dirs.iter().any(|p| p.starts_with(&prefix));
            let has_child_file = share.files.keys().any(|p| p.starts_with(&prefix));
            if has_child_dir || has_child_file {
                return Err(StorageError::directory_not_empty(format!(
                    "{}:{}",
                    dir.share(),
                    dir.path()
                )));
            }
            share.dirs.remove(dir.path());
        }
        self.log("delete_dir", dir.share(), dir.path());
        Ok(())
    }
}
