//! # contract: shared types and the command-execution seam
//!
//! Everything ferry does to remote storage goes through an external transfer
//! tool (rclone). This module defines the one trait that isolates process
//! management from the orchestration logic, plus the plain data passed between
//! the layers.
//!
//! ## Interface
//! - [`CommandRunner`] runs an argv token sequence with a wall-clock bound and
//!   classifies the outcome. [`crate::runner::ProcessRunner`] is the real
//!   implementation; tests use the generated `MockCommandRunner`.
//! - [`TransferError`] is the complete failure surface callers must handle.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`. The mock is exported under the
//!   `test-export-mocks` feature so the CLI crate can drive the core without
//!   spawning processes.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One unit of work: the show (group) and the episode (file) inside it.
///
/// `show` is used as a path segment and `episode` both as a path segment and as
/// the key matched against remote listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub show: String,
    pub episode: String,
}

impl Job {
    pub fn new(show: impl Into<String>, episode: impl Into<String>) -> Self {
        Self {
            show: show.into(),
            episode: episode.into(),
        }
    }
}

/// A single entry of `rclone lsjson` output.
///
/// Only `Name` takes part in matching. It is optional here so that a listing is
/// still scanned in order up to the first entry lacking it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListingEntry {
    pub name: Option<String>,
    #[serde(default)]
    pub path: String,
    /// rclone reports -1 when the size is unknown.
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub is_dir: bool,
}

/// Captured result of a finished transfer command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was ended by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// Successful output carrying `stdout`, mostly useful for fakes.
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// Failure of a single transfer command.
///
/// These two kinds are the only errors download and upload ever return.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The command ran past its wall-clock bound and was killed.
    #[error("transfer command timed out after {timeout:?} and was killed")]
    Timeout { timeout: Duration },

    /// The command exited unsuccessfully or could not be started at all.
    #[error("transfer command failed (exit code {code:?}): {reason}")]
    BadResponse { code: Option<i32>, reason: String },
}

impl TransferError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransferError::Timeout { .. })
    }

    pub fn is_bad_response(&self) -> bool {
        matches!(self, TransferError::BadResponse { .. })
    }
}

/// Executes an external command with a bounded wait.
///
/// `command[0]` is the program, the rest are its arguments. Output is captured,
/// never forwarded to the caller's own stdout/stderr.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion or until `timeout` elapses.
    ///
    /// Returns [`TransferError::Timeout`] after killing a process that ran too
    /// long and [`TransferError::BadResponse`] on a non-zero exit.
    async fn run(&self, command: &[String], timeout: Duration)
        -> Result<ProcessOutput, TransferError>;
}
