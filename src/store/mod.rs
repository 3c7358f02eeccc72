//! JSON-array stores in the switcher's app-data directory
//!
//! Both stores read the whole file, change it in memory and write it back.
//! There is no locking: concurrent writers race and the last write wins.

use crate::error::{SwitcherError, SwitcherResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod ignore_store;
pub mod session_store;

pub use ignore_store::IgnoreListStore;
pub use session_store::SessionStore;

/// A file holding one pretty-printed JSON array
#[derive(Debug, Clone)]
pub(crate) struct JsonArrayFile {
    path: PathBuf,
}

impl JsonArrayFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Create parent directories and an empty `[]` file when missing
    pub(crate) fn ensure_file(&self) -> SwitcherResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        if !self.path.exists() {
            debug!(path = %self.path.display(), "creating empty store file");
            self.write::<serde_json::Value>(&[])?;
        }
        Ok(())
    }

    pub(crate) fn read<T: DeserializeOwned>(&self) -> SwitcherResult<Vec<T>> {
        self.ensure_file()?;
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|e| SwitcherError::CorruptStore {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub(crate) fn write<T: Serialize>(&self, items: &[T]) -> SwitcherResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
