//! Local filesystem collaborator: classification and breadth-first tree
//! enumeration feeding the upload engine.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FscError, FscResult};
use crate::path_util;

/// One enumerated directory and the files directly inside it.
///
/// `walk` yields these in breadth-first order, so a directory always
/// appears before any directory or file beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedDir {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

pub trait LocalFs: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_directory(&self, path: &Path) -> bool;

    /// Final path component as a plain string.
    fn base_name(&self, path: &Path) -> FscResult<String>;

    /// Components of `full` relative to `root`. Empty when they are equal.
    fn relative_components(&self, root: &Path, full: &Path) -> Vec<String>;

    /// Enumerate the tree under `root` breadth-first. An unreadable
    /// subtree is logged and skipped; it never aborts its siblings.
    fn walk(&self, root: &Path) -> FscResult<Vec<WalkedDir>>;
}

/// [`LocalFs`] backed by the real disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFs;

impl LocalFs for DiskFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn base_name(&self, path: &Path) -> FscResult<String> {
        let name = path_util::base_name(&path.to_string_lossy(), std::path::MAIN_SEPARATOR)
            .to_string();
        if name.is_empty() {
            return Err(FscError::local_path(format!(
                "{} has no file name",
                path.display()
            )));
        }
        Ok(name)
    }

    fn relative_components(&self, root: &Path, full: &Path) -> Vec<String> {
        let relative = path_util::relative_path(
            &root.to_string_lossy(),
            &full.to_string_lossy(),
            std::path::MAIN_SEPARATOR,
        );
        path_util::split(&relative, &std::path::MAIN_SEPARATOR.to_string())
    }

    fn walk(&self, root: &Path) -> FscResult<Vec<WalkedDir>> {
        if !root.is_dir() {
            return Err(FscError::local_path(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut out = Vec::new();
        let mut queue = VecDeque::from([root.to_path_buf()]);

        while let Some(dir) = queue.pop_front() {
            let mut files = Vec::new();
            match fs::read_dir(&dir) {
                Ok(entries) => {
                    for entry in entries {
                        match entry {
                            Ok(entry) => {
                                let path = entry.path();
                                if path.is_dir() {
                                    queue.push_back(path);
                                } else {
                                    files.push(path);
                                }
                            }
                            Err(e) => {
                                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                }
            }
            files.sort();
            out.push(WalkedDir { dir, files });
        }

        Ok(out)
    }
}
