//! Navigation state over the remote namespace.

use std::sync::Arc;

use fsc_sdk::{DirectoryRef, ShareRef, StorageClient};

use crate::error::{FscError, FscResult};

/// Current position inside the remote namespace: account root, a share
/// root, or a directory below it.
///
/// Invariants: a directory is selected iff a share is selected, and the
/// URI always reflects the deepest selected scope. Only the foreground
/// task mutates this; sync workers get cloned [`DirectoryRef`]s.
pub struct RemoteNamespace {
    client: Arc<dyn StorageClient>,
    share: Option<ShareRef>,
    directory: Option<DirectoryRef>,
    uri: String,
}

impl RemoteNamespace {
    #[must_use]
    pub fn new(client: Arc<dyn StorageClient>) -> Self {
        let uri = client.base_uri();
        Self {
            client,
            share: None,
            directory: None,
            uri,
        }
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn StorageClient> {
        Arc::clone(&self.client)
    }

    #[must_use]
    pub fn current_share(&self) -> Option<&ShareRef> {
        self.share.as_ref()
    }

    #[must_use]
    pub fn current_directory(&self) -> Option<&DirectoryRef> {
        self.directory.as_ref()
    }

    /// URI rendered in the shell prompt.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Select a share and its root directory. Only valid at the account
    /// root; the literal names "." and ".." are rejected before any
    /// remote call because the existence probe misbehaves on them.
    pub async fn enter_share(&mut self, name: &str) -> FscResult<()> {
        if self.share.is_some() {
            return Err(FscError::invalid_argument("already inside a share"));
        }
        if name == "." || name == ".." {
            return Err(FscError::invalid_argument(format!(
                "invalid share name: {name}"
            )));
        }

        let share = self.client.share_ref(name);
        if !self.client.share_exists(&share).await? {
            return Err(FscError::not_found(format!("share {name}")));
        }

        let root = share.root_directory();
        self.uri = root.uri();
        self.share = Some(share);
        self.directory = Some(root);
        Ok(())
    }

    /// Navigate within the selected share. `".."` at the share root exits
    /// the share entirely; below root it moves to the immediate parent.
    /// `"."` is a no-op. Any other name is committed only after the child
    /// directory is confirmed to exist remotely.
    pub async fn enter_directory(&mut self, name: &str) -> FscResult<()> {
        let Some(current) = self.directory.clone() else {
            return Err(FscError::NotInShare);
        };

        match name {
            "." => Ok(()),
            ".." => {
                if current.is_root() {
                    self.exit_to_root();
                } else {
                    let parent = current.parent();
                    self.uri = parent.uri();
                    self.directory = Some(parent);
                }
                Ok(())
            }
            _ => {
                let child = current.subdirectory(name);
                if self.client.directory_exists(&child).await? {
                    self.uri = child.uri();
                    self.directory = Some(child);
                    Ok(())
                } else {
                    Err(FscError::not_found(format!("directory {name}")))
                }
            }
        }
    }

    /// Drop back to the account root.
    pub fn exit_to_root(&mut self) {
        self.share = None;
        self.directory = None;
        self.uri = self.client.base_uri();
    }
}
