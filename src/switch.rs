//! Switching the launcher to a stored account

use crate::auth::render_remember_me;
use crate::config::{LauncherSection, ResolvedPaths, SwitcherConfig};
use crate::error::{redact_token, SwitcherError, SwitcherResult};
use crate::launcher::{restart_with_session_file, LauncherControl};
use crate::models::LoginSession;
use crate::store::SessionStore;
use tracing::info;

/// Rewrites the launcher's session file to sign in as another account
#[derive(Debug, Clone)]
pub struct SwitchService {
    paths: ResolvedPaths,
    launcher: LauncherSection,
    sessions: SessionStore,
}

impl SwitchService {
    pub fn new(config: &SwitcherConfig) -> SwitcherResult<Self> {
        let paths = config.resolve_paths();
        let sessions = SessionStore::new(paths.app_data_dir()?);
        Ok(Self {
            paths,
            launcher: config.launcher.clone(),
            sessions,
        })
    }

    /// Switch to the stored session of `user_id`
    pub async fn switch_to<L>(&self, control: &L, user_id: &str) -> SwitcherResult<()>
    where
        L: LauncherControl + ?Sized,
    {
        let session = self
            .sessions
            .find(user_id)?
            .ok_or_else(|| SwitcherError::session_not_found(user_id))?;
        self.switch_account(control, &session).await
    }

    /// Close the launcher, write `session`'s token, start the launcher again
    #[tracing::instrument(
        name = "switch_account",
        skip(self, control, session),
        fields(user_id = %session.user_id)
    )]
    pub async fn switch_account<L>(&self, control: &L, session: &LoginSession) -> SwitcherResult<()>
    where
        L: LauncherControl + ?Sized,
    {
        if session.login_token.is_empty() {
            return Err(SwitcherError::invalid_input(format!(
                "session {} has no login token",
                session.user_id
            )));
        }
        let session_file = self.paths.session_file()?;

        info!(
            account = %session.display_name(),
            token = %redact_token(&session.login_token),
            "switching account"
        );
        restart_with_session_file(
            control,
            &self.launcher,
            session_file,
            &self.paths.launcher_path,
            &render_remember_me(&session.login_token),
        )
        .await
    }
}
