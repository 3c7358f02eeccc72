//! `login_sessions.json`

use super::JsonArrayFile;
use crate::error::{SwitcherError, SwitcherResult};
use crate::models::{now_timestamp, LoginSession};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SESSIONS_FILE_NAME: &str = "login_sessions.json";
pub const AVATAR_DIR_NAME: &str = "avatars";

/// Persistent list of known launcher sessions, keyed by user ID
#[derive(Debug, Clone)]
pub struct SessionStore {
    file: JsonArrayFile,
    app_data_dir: PathBuf,
}

impl SessionStore {
    pub fn new(app_data_dir: &Path) -> Self {
        Self {
            file: JsonArrayFile::new(app_data_dir.join(SESSIONS_FILE_NAME)),
            app_data_dir: app_data_dir.to_path_buf(),
        }
    }

    pub fn file_path(&self) -> &Path {
        self.file.path()
    }

    /// Directory holding avatar images and their thumbnails
    pub fn avatar_dir(&self) -> PathBuf {
        self.app_data_dir.join(AVATAR_DIR_NAME)
    }

    pub fn load_sessions(&self) -> SwitcherResult<Vec<LoginSession>> {
        self.file.read()
    }

    pub fn save_sessions(&self, sessions: &[LoginSession]) -> SwitcherResult<()> {
        self.file.write(sessions)
    }

    pub fn find(&self, user_id: &str) -> SwitcherResult<Option<LoginSession>> {
        Ok(self
            .load_sessions()?
            .into_iter()
            .find(|s| s.user_id == user_id))
    }

    pub fn contains(&self, user_id: &str) -> SwitcherResult<bool> {
        Ok(self.find(user_id)?.is_some())
    }

    /// Merge `session` into the store.
    ///
    /// An existing record only gains a username or token it was missing; a
    /// non-empty alias always replaces the stored one. Unknown user IDs are
    /// appended with fresh timestamps.
    pub fn add_or_update(&self, mut session: LoginSession) -> SwitcherResult<()> {
        let mut sessions = self.load_sessions()?;

        match sessions.iter_mut().find(|s| s.user_id == session.user_id) {
            Some(existing) => {
                if existing.username.is_empty() && !session.username.is_empty() {
                    existing.username = session.username;
                }
                if existing.login_token.is_empty() && !session.login_token.is_empty() {
                    existing.login_token = session.login_token;
                }
                if !session.alias.is_empty() {
                    existing.alias = session.alias;
                }
                existing.touch();
                debug!(user_id = %existing.user_id, "merged into existing session");
            }
            None => {
                let now = now_timestamp();
                session.created_at = now.clone();
                session.updated_at = now;
                info!(user_id = %session.user_id, "storing new session");
                sessions.push(session);
            }
        }

        self.save_sessions(&sessions)
    }

    pub fn update_alias(&self, user_id: &str, alias: &str) -> SwitcherResult<()> {
        self.modify(user_id, |s| s.alias = alias.to_string())
    }

    pub fn update_avatar_image(&self, user_id: &str, filename: &str) -> SwitcherResult<()> {
        self.modify(user_id, |s| s.avatar_image = filename.to_string())
    }

    pub fn update_avatar_color(&self, user_id: &str, color: &str) -> SwitcherResult<()> {
        self.modify(user_id, |s| s.avatar_color = color.to_string())
    }

    /// Replace the stored token; returns false when it was already current
    pub fn update_login_token(&self, user_id: &str, token: &str) -> SwitcherResult<bool> {
        let mut sessions = self.load_sessions()?;
        let session = sessions
            .iter_mut()
            .find(|s| s.user_id == user_id)
            .ok_or_else(|| SwitcherError::session_not_found(user_id))?;

        if session.login_token == token {
            return Ok(false);
        }
        session.login_token = token.to_string();
        session.touch();
        self.save_sessions(&sessions)?;
        Ok(true)
    }

    pub fn delete_session(&self, user_id: &str) -> SwitcherResult<()> {
        let mut sessions = self.load_sessions()?;
        let before = sessions.len();
        sessions.retain(|s| s.user_id != user_id);
        if sessions.len() == before {
            return Err(SwitcherError::session_not_found(user_id));
        }
        info!(user_id, "session deleted");
        self.save_sessions(&sessions)
    }

    fn modify<F>(&self, user_id: &str, change: F) -> SwitcherResult<()>
    where
        F: FnOnce(&mut LoginSession),
    {
        let mut sessions = self.load_sessions()?;
        let session = sessions
            .iter_mut()
            .find(|s| s.user_id == user_id)
            .ok_or_else(|| SwitcherError::session_not_found(user_id))?;
        change(session);
        session.touch();
        self.save_sessions(&sessions)
    }
}
