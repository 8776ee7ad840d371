//! External command execution
//!
//! Every process this crate spawns (osascript, zellij, tmux, terminal-notifier)
//! goes through [`CommandRunner`], so the focus heuristic can be driven by a
//! scripted runner in tests.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Failure of a single external query
#[derive(Debug, Error)]
pub enum QueryError {
    /// The program is not installed / not in PATH
    #[error("{program} not found")]
    NotFound { program: String },
    /// The program ran but exited unsuccessfully
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    /// The program did not finish within the timeout
    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
    /// Spawning or reading the program failed for another reason
    #[error("{program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound { .. })
    }

    /// Log the failure: missing tools are expected and stay quiet.
    pub fn log(&self) {
        if self.is_not_found() {
            debug!("{}", self);
        } else {
            warn!("Command failed: {}", self);
        }
    }
}

/// Runs an external program and returns its stdout
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<String, QueryError>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        limit: Duration,
    ) -> Result<String, QueryError> {
        debug!("Running {} {:?}", program, args);

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| io_error(program, source))?;

        let output = timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| QueryError::TimedOut {
                program: program.to_string(),
                timeout: limit,
            })?
            .map_err(|source| io_error(program, source))?;

        if !output.status.success() {
            return Err(QueryError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn io_error(program: &str, source: std::io::Error) -> QueryError {
    if source.kind() == std::io::ErrorKind::NotFound {
        QueryError::NotFound {
            program: program.to_string(),
        }
    } else {
        QueryError::Io {
            program: program.to_string(),
            source,
        }
    }
}
