//! Command variants and their three-phase lifecycle.
//!
//! A line of input becomes one [`Command`], which runs
//! `pre_execute` → `execute` → `post_execute` against the shared
//! [`RemoteNamespace`]. `pre_execute` validates arguments and namespace
//! preconditions and fails fast, before any remote mutation.

use std::path::Path;
use std::sync::Arc;

use fsc_sdk::DirectoryRef;

use crate::error::{FscError, FscResult};
use crate::local_fs::LocalFs;
use crate::namespace::RemoteNamespace;
use crate::pager::PagedLister;
use crate::sync::TreeSync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the current scope: shares at the account root, files and
    /// directories inside a share.
    Dir,
    Cd(Vec<String>),
    Upload(Vec<String>),
    Delete(Vec<String>),
    /// Unknown verb: validates nothing, does nothing.
    Default(String),
}

impl Command {
    /// Tokenize a line: first whitespace-delimited token is the verb, the
    /// rest are positional arguments. No quoting or escaping.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut tokens = line.split_whitespace().map(ToString::to_string);
        let verb = tokens.next().unwrap_or_default();
        let args: Vec<String> = tokens.collect();

        match verb.as_str() {
            "dir" => Self::Dir,
            "cd" => Self::Cd(args),
            "upload" => Self::Upload(args),
            "delete" => Self::Delete(args),
            _ => Self::Default(verb),
        }
    }

    /// Validate argument shape and namespace preconditions.
    pub fn pre_execute(&self, ns: &RemoteNamespace) -> FscResult<()> {
        match self {
            Self::Dir | Self::Default(_) => Ok(()),
            Self::Cd(args) => {
                let Some(target) = args.first() else {
                    return Err(FscError::invalid_argument("missing arguments"));
                };
                // At the account root these would be probed as share
                // names, which the remote side rejects badly.
                if ns.current_share().is_none() && (target == "." || target == "..") {
                    return Err(FscError::invalid_argument(format!(
                        "invalid share name: {target}"
                    )));
                }
                Ok(())
            }
            Self::Upload(args) | Self::Delete(args) => {
                if args.is_empty() {
                    return Err(FscError::invalid_argument("missing arguments"));
                }
                if ns.current_share().is_none() {
                    return Err(FscError::NotInShare);
                }
                Ok(())
            }
        }
    }

    /// Perform the (possibly remote-mutating) work.
    pub async fn execute(
        &self,
        ns: &mut RemoteNamespace,
        fs: &Arc<dyn LocalFs>,
    ) -> FscResult<()> {
        match self {
            Self::Dir => Self::execute_dir(ns).await,
            Self::Cd(args) => {
                let target = &args[0];
                if ns.current_share().is_none() {
                    ns.enter_share(target).await
                } else {
                    ns.enter_directory(target).await
                }
            }
            Self::Upload(args) => Self::execute_upload(ns, fs, args).await,
            Self::Delete(args) => {
                let dest = Self::current_directory(ns)?;
                TreeSync::new(ns.client(), Arc::clone(fs))
                    .delete(&dest, &args[0])
                    .await
            }
            Self::Default(_) => Ok(()),
        }
    }

    /// Cleanup hook; a no-op for every current variant.
    pub fn post_execute(&self) {}

    async fn execute_dir(ns: &RemoteNamespace) -> FscResult<()> {
        let lister = PagedLister::new(ns.client());
        match ns.current_directory() {
            None => {
                for share in lister.list_shares().await? {
                    println!("    {}", share.name);
                }
            }
            Some(dir) => {
                for child in lister.list_children(dir).await? {
                    if child.kind.is_dir() {
                        println!("<d> {}", child.name);
                    } else {
                        println!("    {}", child.name);
                    }
                }
            }
        }
        Ok(())
    }

    async fn execute_upload(
        ns: &RemoteNamespace,
        fs: &Arc<dyn LocalFs>,
        args: &[String],
    ) -> FscResult<()> {
        let local = Path::new(&args[0]);
        let dest = Self::current_directory(ns)?;
        let sync = TreeSync::new(ns.client(), Arc::clone(fs));

        if fs.is_directory(local) {
            sync.upload_tree(local, &dest).await
        } else {
            let name = sync
                .upload_file(local, &dest, args.get(1).map(String::as_str))
                .await?;
            println!("Uploaded {name}");
            Ok(())
        }
    }

    fn current_directory(ns: &RemoteNamespace) -> FscResult<DirectoryRef> {
        ns.current_directory().cloned().ok_or(FscError::NotInShare)
    }
}
