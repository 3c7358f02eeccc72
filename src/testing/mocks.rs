//! Mock implementations for testing
//!
//! Provides a mock [`LauncherControl`] so switch and move-aside flows can be
//! exercised without a real launcher process.

use crate::error::{SwitcherError, SwitcherResult};
use crate::launcher::LauncherControl;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Recorded launcher interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherCall {
    IsRunning,
    Terminate,
    Launch(PathBuf),
}

/// Mock launcher for testing
///
/// `terminate` reports whether the launcher was running; afterwards the
/// process "lingers" for `polls_until_exit` further `is_running` checks.
#[derive(Debug, Default, Clone)]
pub struct MockLauncher {
    pub calls: Arc<Mutex<Vec<LauncherCall>>>,
    running: Arc<AtomicBool>,
    polls_until_exit: Arc<AtomicUsize>,
    never_exits: bool,
    fail_launch: bool,
    fail_listing: bool,
}

impl MockLauncher {
    /// A launcher that is not running
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher that is running and exits after `polls` status checks
    pub fn running(polls: usize) -> Self {
        let mock = Self::default();
        mock.running.store(true, Ordering::SeqCst);
        mock.polls_until_exit.store(polls, Ordering::SeqCst);
        mock
    }

    /// A running launcher that ignores termination
    pub fn stuck() -> Self {
        let mut mock = Self::running(0);
        mock.never_exits = true;
        mock
    }

    pub fn with_launch_failure(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Status checks fail as if the process tool were missing
    pub fn with_listing_failure(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn get_calls(&self) -> Vec<LauncherCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn launched_paths(&self) -> Vec<PathBuf> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                LauncherCall::Launch(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn is_alive(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn record(&self, call: LauncherCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl LauncherControl for MockLauncher {
    async fn is_running(&self) -> SwitcherResult<bool> {
        self.record(LauncherCall::IsRunning);
        if self.fail_listing {
            return Err(SwitcherError::launcher("mock process listing failure"));
        }
        if !self.running.load(Ordering::SeqCst) {
            return Ok(false);
        }
        if self.never_exits {
            return Ok(true);
        }
        let remaining = self.polls_until_exit.load(Ordering::SeqCst);
        if remaining == 0 {
            self.running.store(false, Ordering::SeqCst);
            return Ok(false);
        }
        self.polls_until_exit.store(remaining - 1, Ordering::SeqCst);
        Ok(true)
    }

    async fn terminate(&self) -> SwitcherResult<bool> {
        self.record(LauncherCall::Terminate);
        Ok(self.running.load(Ordering::SeqCst))
    }

    async fn launch(&self, executable: &Path) -> SwitcherResult<()> {
        self.record(LauncherCall::Launch(executable.to_path_buf()));
        if self.fail_launch {
            return Err(SwitcherError::launcher("mock launch failure"));
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }
}
