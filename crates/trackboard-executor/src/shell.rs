//! Local shell build runner.

use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

use trackboard_core::runner::{BuildOutput, BuildRunner};
use trackboard_core::{Error, Result};

/// Runs build commands through the system shell in the repository's working
/// directory. A command that exits non-zero is still a completed build; the
/// exit status is reported in the output.
#[derive(Debug, Default)]
pub struct LocalShellExecutor;

impl LocalShellExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BuildRunner for LocalShellExecutor {
    fn name(&self) -> &'static str {
        "local-shell"
    }

    async fn exec(&self, command: &str, working_dir: &Path) -> Result<BuildOutput> {
        if command.trim().is_empty() {
            return Err(Error::InvalidInput("build command is empty".to_string()));
        }

        info!(command = %command, dir = %working_dir.display(), "Running build command");

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::BuildFailed(format!("failed to spawn build command: {}", e)))?;

        let result = BuildOutput {
            command: command.to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            finished_at: Utc::now(),
        };

        if result.success {
            info!(command = %command, "Build command succeeded");
        } else {
            warn!(command = %command, exit_code = ?result.exit_code, "Build command failed");
        }

        Ok(result)
    }
}
