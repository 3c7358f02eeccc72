//! Launcher control through the operating system's process tools

use super::LauncherControl;
use crate::error::{SwitcherError, SwitcherResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Which process tools to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessTools {
    /// `taskkill` / `tasklist`
    Windows,
    /// `pkill` / `pgrep`
    Unix,
}

impl ProcessTools {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Program and arguments that force-kill `process_name`
    pub fn kill_command(self, process_name: &str) -> (&'static str, Vec<String>) {
        match self {
            Self::Windows => (
                "taskkill",
                vec!["/IM".into(), process_name.into(), "/F".into()],
            ),
            Self::Unix => ("pkill", vec!["-f".into(), process_name.into()]),
        }
    }

    /// Program and arguments that list `process_name`
    pub fn list_command(self, process_name: &str) -> (&'static str, Vec<String>) {
        match self {
            Self::Windows => (
                "tasklist",
                vec!["/FI".into(), format!("IMAGENAME eq {process_name}")],
            ),
            Self::Unix => ("pgrep", vec!["-f".into(), process_name.into()]),
        }
    }

    /// Interpret a failed kill: true when it only means "no such process"
    pub fn kill_failed_because_absent(self, code: Option<i32>, stderr: &str) -> bool {
        match self {
            // taskkill exits 128 and prints "not found" when nothing matches
            Self::Windows => code == Some(128) || stderr.to_lowercase().contains("not found"),
            // pkill exits 1 when no process matched
            Self::Unix => code == Some(1),
        }
    }

    /// Interpret the list command's outcome
    pub fn listing_shows_process(
        self,
        process_name: &str,
        success: bool,
        stdout: &str,
    ) -> bool {
        match self {
            // tasklist prints an "INFO: No tasks" line and exits 0 when empty
            Self::Windows => stdout.contains(process_name),
            Self::Unix => success && !stdout.trim().is_empty(),
        }
    }
}

/// [`LauncherControl`] backed by the real process table
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    process_name: String,
    tools: ProcessTools,
}

impl SystemLauncher {
    pub fn new(process_name: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            tools: ProcessTools::current(),
        }
    }

    pub fn with_tools(mut self, tools: ProcessTools) -> Self {
        self.tools = tools;
        self
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }
}

#[async_trait]
impl LauncherControl for SystemLauncher {
    async fn is_running(&self) -> SwitcherResult<bool> {
        let (program, args) = self.tools.list_command(&self.process_name);
        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SwitcherError::launcher(format!("failed to run {program}: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(self
            .tools
            .listing_shows_process(&self.process_name, output.status.success(), &stdout))
    }

    async fn terminate(&self) -> SwitcherResult<bool> {
        let (program, args) = self.tools.kill_command(&self.process_name);
        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SwitcherError::launcher(format!("failed to run {program}: {e}")))?;

        if output.status.success() {
            info!(process = %self.process_name, "launcher terminated");
            return Ok(true);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if self
            .tools
            .kill_failed_because_absent(output.status.code(), &stderr)
        {
            debug!(process = %self.process_name, "no launcher process to terminate");
            return Ok(false);
        }

        Err(SwitcherError::launcher(format!(
            "failed to close Epic Games Launcher: {program} exited with {}: {}",
            output.status,
            stderr.trim()
        )))
    }

    async fn launch(&self, executable: &Path) -> SwitcherResult<()> {
        let child = Command::new(executable)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                SwitcherError::launcher(format!(
                    "failed to launch {}: {e}",
                    executable.display()
                ))
            })?;
        debug!(pid = child.id().unwrap_or(0), "launcher process spawned");
        Ok(())
    }
}
