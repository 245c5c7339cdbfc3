/// Addressable handle to a share, independent of whether it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRef {
    name: String,
    uri: String,
}

impl ShareRef {
    #[must_use]
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Reference to the share's root directory.
    #[must_use]
    pub fn root_directory(&self) -> DirectoryRef {
        DirectoryRef {
            share: self.name.clone(),
            share_uri: self.uri.clone(),
            path: String::new(),
        }
    }
}

/// Addressable handle to a directory inside a share.
///
/// `path` is the slash-delimited path relative to the share root; the root
/// itself has an empty path. Components are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRef {
    share: String,
    share_uri: String,
    path: String,
}

impl DirectoryRef {
    #[must_use]
    pub fn share(&self) -> &str {
        &self.share
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    #[must_use]
    pub fn uri(&self) -> String {
        if self.path.is_empty() {
            self.share_uri.clone()
        } else {
            format!("{}/{}", self.share_uri, self.path)
        }
    }

    /// Reference to a child directory. The target need not exist.
    #[must_use]
    pub fn subdirectory(&self, name: &str) -> Self {
        let path = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path, name)
        };
        Self {
            share: self.share.clone(),
            share_uri: self.share_uri.clone(),
            path,
        }
    }

    /// Reference to the parent directory. The parent of the root is the
    /// root itself.
    #[must_use]
    pub fn parent(&self) -> Self {
        let path = match self.path.rsplit_once('/') {
            Some((rest, _)) => rest.to_string(),
            None => String::new(),
        };
        Self {
            share: self.share.clone(),
            share_uri: self.share_uri.clone(),
            path,
        }
    }
}

/// Kind of a directory child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    #[must_use]
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }
}

/// One child of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChildEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl ChildEntry {
    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    #[must_use]
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// One share of an account listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShareEntry {
    pub name: String,
}

/// One page of a paginated listing.
///
/// `next_token` is an opaque cursor: `None` signals exhaustion, anything
/// else must be passed back verbatim to fetch the following page.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T> {
    pub entries: Vec<T>,
    pub next_token: Option<String>,
}
