//! BuildRunner trait and build output types.
//!
//! Build runners execute a repository's configured build command in its
//! working directory and report the captured outcome.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Captured outcome of a completed build command.
///
/// A command that ran to completion with a non-zero exit status is still a
/// completed build; only a command that could not be started at all surfaces
/// as an error from the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutput {
    /// The command line that was executed.
    pub command: String,
    /// Exit code, if the process terminated normally.
    pub exit_code: Option<i32>,
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// When the command finished.
    pub finished_at: DateTime<Utc>,
}

/// Trait for build invokers.
#[async_trait]
pub trait BuildRunner: Send + Sync {
    /// Name of this runner.
    fn name(&self) -> &'static str;

    /// Run `command` with the given working directory and capture its output.
    async fn exec(&self, command: &str, working_dir: &Path) -> Result<BuildOutput>;
}
