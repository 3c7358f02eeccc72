//! `ignored_sessions.json`

use super::JsonArrayFile;
use crate::error::SwitcherResult;
use std::path::Path;
use tracing::info;

pub const IGNORE_FILE_NAME: &str = "ignored_sessions.json";

/// User IDs the switcher should never offer to store
#[derive(Debug, Clone)]
pub struct IgnoreListStore {
    file: JsonArrayFile,
}

impl IgnoreListStore {
    pub fn new(app_data_dir: &Path) -> Self {
        Self {
            file: JsonArrayFile::new(app_data_dir.join(IGNORE_FILE_NAME)),
        }
    }

    pub fn file_path(&self) -> &Path {
        self.file.path()
    }

    pub fn load(&self) -> SwitcherResult<Vec<String>> {
        self.file.read()
    }

    pub fn save(&self, list: &[String]) -> SwitcherResult<()> {
        self.file.write(list)
    }

    /// Add a user ID; already-ignored IDs are left alone
    pub fn add(&self, user_id: &str) -> SwitcherResult<()> {
        let mut list = self.load()?;
        if list.iter().any(|id| id == user_id) {
            return Ok(());
        }
        list.push(user_id.to_string());
        info!(user_id, "user added to ignore list");
        self.save(&list)
    }

    /// Remove a user ID; unknown IDs are not an error
    pub fn remove(&self, user_id: &str) -> SwitcherResult<()> {
        let mut list = self.load()?;
        let before = list.len();
        list.retain(|id| id != user_id);
        if list.len() == before {
            return Ok(());
        }
        info!(user_id, "user removed from ignore list");
        self.save(&list)
    }

    pub fn is_ignored(&self, user_id: &str) -> SwitcherResult<bool> {
        Ok(self.load()?.iter().any(|id| id == user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = IgnoreListStore::new(dir.path());

        store.add("u1").unwrap();
        store.add("u1").unwrap();
        store.add("u2").unwrap();

        assert_eq!(store.load().unwrap(), vec!["u1", "u2"]);
    }

    #[test]
    fn test_save_before_any_load() {
        let dir = TempDir::new().unwrap();
        let store = IgnoreListStore::new(&dir.path().join("not-yet-created"));

        store.save(&["u1".to_string()]).unwrap();
        assert!(store.is_ignored("u1").unwrap());
    }

    #[test]
    fn test_remove_and_is_ignored() {
        let dir = TempDir::new().unwrap();
        let store = IgnoreListStore::new(dir.path());
        store.add("u1").unwrap();

        assert!(store.is_ignored("u1").unwrap());
        store.remove("u1").unwrap();
        assert!(!store.is_ignored("u1").unwrap());

        // removing again is fine
        store.remove("u1").unwrap();
    }
}
