//! Shell state and per-line execution.

use std::sync::Arc;

use fsc_sdk::StorageClient;

use crate::command::Command;
use crate::error::FscResult;
use crate::local_fs::{DiskFs, LocalFs};
use crate::namespace::RemoteNamespace;

/// What the caller should do after one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Exit,
}

/// Drives one input line at a time through the command lifecycle:
/// tokenize, validate (`pre_execute`), execute, report. Commands run to
/// completion, joins included, before the next line is read; any error is
/// returned to the caller, printed there, and the session continues.
pub struct Shell {
    pub namespace: RemoteNamespace,
    fs: Arc<dyn LocalFs>,
}

impl Shell {
    #[must_use]
    pub fn new(client: Arc<dyn StorageClient>) -> Self {
        Self::with_local_fs(client, Arc::new(DiskFs))
    }

    #[must_use]
    pub fn with_local_fs(client: Arc<dyn StorageClient>, fs: Arc<dyn LocalFs>) -> Self {
        Self {
            namespace: RemoteNamespace::new(client),
            fs,
        }
    }

    /// URI of the current scope, rendered in the prompt.
    #[must_use]
    pub fn prompt_uri(&self) -> &str {
        self.namespace.uri()
    }

    /// Execute a single input line.
    pub async fn execute(&mut self, line: &str) -> FscResult<LineOutcome> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(LineOutcome::Continue);
        }
        if line == "exit" {
            return Ok(LineOutcome::Exit);
        }

        let command = Command::parse(line);
        command.pre_execute(&self.namespace)?;
        command.execute(&mut self.namespace, &self.fs).await?;
        command.post_execute();
        Ok(LineOutcome::Continue)
    }
}
