//! Detecting the launcher's current login and reconciling it with the stores
//!
//! Three sources feed one decision: the session INI file gives the token,
//! the Data folder gives the user ID, and the two JSON stores say whether
//! that user is already known or was deliberately ignored.

use crate::config::{LauncherSection, ResolvedPaths, SwitcherConfig};
use crate::error::{redact_token, SwitcherError, SwitcherResult};
use crate::launcher::{restart_with_session_file, LauncherControl};
use crate::logreader::LogReaderService;
use crate::models::LoginSession;
use crate::store::{IgnoreListStore, SessionStore};
use std::fs;
use tracing::{debug, info, warn};

pub mod data_folder;
pub mod session_file;

pub use data_folder::{current_user_id, user_id_from_filename};
pub use session_file::{extract_login_token, render_remember_me, MIN_TOKEN_LEN};

/// What a sync did with the launcher's current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Unknown user; a new record was stored
    Added(LoginSession),
    /// Known user whose token changed; the stored token was replaced
    Renewed(LoginSession),
    /// Known user, same token
    Unchanged(LoginSession),
    /// User is on the ignore list; nothing was written
    Ignored(LoginSession),
}

impl SyncOutcome {
    pub fn session(&self) -> &LoginSession {
        match self {
            Self::Added(s) | Self::Renewed(s) | Self::Unchanged(s) | Self::Ignored(s) => s,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::Renewed(_) => "renewed",
            Self::Unchanged(_) => "unchanged",
            Self::Ignored(_) => "ignored",
        }
    }
}

/// Login and session related operations
#[derive(Debug, Clone)]
pub struct AuthService {
    paths: ResolvedPaths,
    launcher: LauncherSection,
    sessions: SessionStore,
    ignored: IgnoreListStore,
}

impl AuthService {
    pub fn new(config: &SwitcherConfig) -> SwitcherResult<Self> {
        let paths = config.resolve_paths();
        let app_data = paths.app_data_dir()?.to_path_buf();
        Ok(Self {
            sessions: SessionStore::new(&app_data),
            ignored: IgnoreListStore::new(&app_data),
            launcher: config.launcher.clone(),
            paths,
        })
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn ignore_store(&self) -> &IgnoreListStore {
        &self.ignored
    }

    /// The session the launcher is signed in with right now.
    ///
    /// Fails with [`SwitcherError::NotLoggedIn`] when the INI file holds no
    /// usable token.
    pub fn current_login_session(&self) -> SwitcherResult<LoginSession> {
        let path = self.paths.session_file()?;
        let content = fs::read_to_string(path).map_err(|e| {
            SwitcherError::not_logged_in(format!("cannot read session file: {e}"))
        })?;
        let token = extract_login_token(&content)?;
        let user_id = current_user_id(self.paths.epic_data_dir()?)?;

        debug!(user_id = %user_id, token = %redact_token(&token), "current login session");
        Ok(LoginSession::detected(user_id, token))
    }

    /// The current session if it is neither ignored nor stored yet
    pub fn detect_new_login_session(&self) -> SwitcherResult<Option<LoginSession>> {
        let session = self.current_login_session()?;
        if self.check_if_session_is_new(&session.user_id)? {
            Ok(Some(session))
        } else {
            Ok(None)
        }
    }

    pub fn check_if_session_is_new(&self, user_id: &str) -> SwitcherResult<bool> {
        if self.ignored.is_ignored(user_id)? {
            info!(user_id, "user is in ignore list, skipping prompt");
            return Ok(false);
        }
        Ok(!self.sessions.contains(user_id)?)
    }

    pub fn add_detected_session(&self, session: LoginSession) -> SwitcherResult<()> {
        if session.user_id.is_empty() {
            return Err(SwitcherError::invalid_input("userID is required"));
        }
        let user_id = session.user_id.clone();
        self.sessions.add_or_update(session)?;
        info!(user_id = %user_id, "user accepted and session added");
        Ok(())
    }

    pub fn ignore_detected_session(&self, user_id: &str) -> SwitcherResult<()> {
        if user_id.is_empty() {
            return Err(SwitcherError::invalid_input("userID is required"));
        }
        self.ignored.add(user_id)
    }

    pub fn unignore_session(&self, user_id: &str) -> SwitcherResult<()> {
        self.ignored.remove(user_id)
    }

    /// Refresh the stored token of the current user if the launcher rotated it
    pub fn check_and_renew_login_token(&self) -> SwitcherResult<bool> {
        let session = self.current_login_session()?;
        if !self.sessions.contains(&session.user_id)? {
            return Ok(false);
        }
        let renewed = self
            .sessions
            .update_login_token(&session.user_id, &session.login_token)?;
        if renewed {
            info!(user_id = %session.user_id, "login token renewed");
        }
        Ok(renewed)
    }

    /// Reconcile the launcher's current session with the stores
    pub fn sync_current_login_session(&self) -> SwitcherResult<SyncOutcome> {
        let session = self.current_login_session()?;

        if self.ignored.is_ignored(&session.user_id)? {
            debug!(user_id = %session.user_id, "current user is ignored");
            return Ok(SyncOutcome::Ignored(session));
        }

        let Some(stored) = self.sessions.find(&session.user_id)? else {
            let user_id = session.user_id.clone();
            self.sessions.add_or_update(session.clone())?;
            info!(user_id = %user_id, "new login session stored during sync");
            let added = self.sessions.find(&user_id)?.unwrap_or(session);
            return Ok(SyncOutcome::Added(added));
        };

        if self
            .sessions
            .update_login_token(&stored.user_id, &session.login_token)?
        {
            info!(user_id = %stored.user_id, "login token renewed during sync");
            let renewed = self.sessions.find(&stored.user_id)?.unwrap_or(stored);
            return Ok(SyncOutcome::Renewed(renewed));
        }

        Ok(SyncOutcome::Unchanged(stored))
    }

    /// Sync the current session, then fill usernames from the recent logs.
    ///
    /// A failed username pass is logged and does not fail the sync. The
    /// returned session is re-read so it carries any name just found.
    pub fn sync_with_usernames(&self, logs: &LogReaderService) -> SwitcherResult<SyncOutcome> {
        let outcome = self.sync_current_login_session()?;
        if matches!(outcome, SyncOutcome::Ignored(_)) {
            return Ok(outcome);
        }

        match logs.sync_usernames(false) {
            Ok(false) => Ok(outcome),
            Ok(true) => {
                let refreshed = self.sessions.find(&outcome.session().user_id)?;
                Ok(match (outcome, refreshed) {
                    (SyncOutcome::Added(_), Some(s)) => SyncOutcome::Added(s),
                    (SyncOutcome::Renewed(_), Some(s)) => SyncOutcome::Renewed(s),
                    (SyncOutcome::Unchanged(_), Some(s)) => SyncOutcome::Unchanged(s),
                    (outcome, _) => outcome,
                })
            }
            Err(e) => {
                warn!(error = %e, "username sync failed");
                Ok(outcome)
            }
        }
    }

    /// Sign the launcher out so a different account can sign in.
    ///
    /// Stops the launcher, empties the session file and starts it again.
    pub async fn move_aside_active_session<L>(&self, control: &L) -> SwitcherResult<()>
    where
        L: LauncherControl + ?Sized,
    {
        let session_file = self.paths.session_file()?;
        info!(path = %session_file.display(), "clearing session file");
        restart_with_session_file(
            control,
            &self.launcher,
            session_file,
            &self.paths.launcher_path,
            "",
        )
        .await
    }
}
