//! Launcher process control
//!
//! The switcher never talks to the launcher directly. It stops the process,
//! edits the launcher's files while nothing holds them open, and starts it
//! again. [`LauncherControl`] is the seam that lets tests run those flows
//! against a mock instead of a real process table.

use crate::error::{SwitcherError, SwitcherResult};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

pub mod system;

pub use system::SystemLauncher;

/// Operations on the launcher process
#[async_trait]
pub trait LauncherControl: Send + Sync {
    /// Whether any launcher process is alive
    async fn is_running(&self) -> SwitcherResult<bool>;

    /// Force-terminate the launcher.
    ///
    /// Returns `Ok(false)` when no process was running; that is not an error.
    async fn terminate(&self) -> SwitcherResult<bool>;

    /// Start the launcher detached; does not wait for it to come up
    async fn launch(&self, executable: &Path) -> SwitcherResult<()>;
}

/// Terminate the launcher and wait until its process is gone.
///
/// Returns how long the wait took. When nothing was running there is no
/// wait at all.
pub async fn stop_launcher<L>(
    control: &L,
    timeout: Duration,
    poll_interval: Duration,
) -> SwitcherResult<Duration>
where
    L: LauncherControl + ?Sized,
{
    info!("closing Epic Games Launcher");
    if !control.terminate().await? {
        info!("Epic Games Launcher was already closed");
        return Ok(Duration::ZERO);
    }

    let start = Instant::now();
    loop {
        sleep(poll_interval).await;
        match control.is_running().await {
            Ok(false) => break,
            Ok(true) => {}
            // Without a process listing the kill is taken at its word
            Err(e) => {
                warn!(error = %e, "cannot list processes, assuming launcher closed");
                break;
            }
        }
        if start.elapsed() >= timeout {
            return Err(SwitcherError::LauncherShutdownTimeout {
                waited_ms: start.elapsed().as_millis() as u64,
            });
        }
        debug!("launcher still running, polling again");
    }

    let waited = start.elapsed();
    info!(
        waited_ms = waited.as_millis() as u64,
        "Epic Games Launcher process confirmed exited"
    );
    Ok(waited)
}

/// Stop the launcher, replace the session file contents, start it again.
///
/// Shared by account switching and "move aside".
pub async fn restart_with_session_file<L>(
    control: &L,
    config: &crate::config::LauncherSection,
    session_file: &Path,
    launcher_path: &Path,
    contents: &str,
) -> SwitcherResult<()>
where
    L: LauncherControl + ?Sized,
{
    stop_launcher(control, config.shutdown_timeout(), config.poll_interval()).await?;

    tokio::fs::write(session_file, contents).await.map_err(|e| {
        SwitcherError::launcher(format!(
            "failed to write session file {}: {e}",
            session_file.display()
        ))
    })?;
    info!(path = %session_file.display(), "session file written");

    info!(path = %launcher_path.display(), "re-launching Epic Games Launcher");
    control.launch(launcher_path).await?;
    info!("Epic Games Launcher started");
    Ok(())
}
