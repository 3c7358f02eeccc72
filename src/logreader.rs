//! Filling in usernames from the launcher's log files
//!
//! The launcher never writes the account's display name anywhere stable, but
//! every game launch logs a command line carrying both `-epicusername` and
//! `-epicuserid`. Scanning those lines lets stored sessions pick up a name.

use crate::config::SwitcherConfig;
use crate::error::{SwitcherError, SwitcherResult};
use crate::store::SessionStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Marker on the log lines that carry account details
pub const LAUNCH_MARKER: &str = "FCommunityPortalLaunchAppTask: Preparing to launch app";

/// File-name pattern of launcher logs
pub const LOG_FILE_PATTERN: &str = "*EpicGamesLauncher*.log";

static USERNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"-epicusername="([^"]+)""#).expect("valid regex"));
static USER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-epicuserid=([a-f0-9]+)").expect("valid regex"));

/// Username sync over launcher logs
#[derive(Debug, Clone)]
pub struct LogReaderService {
    logs_dir: PathBuf,
    recent_files: usize,
    sessions: SessionStore,
}

impl LogReaderService {
    pub fn new(config: &SwitcherConfig) -> SwitcherResult<Self> {
        let paths = config.resolve_paths();
        Ok(Self {
            logs_dir: paths.logs_dir()?.to_path_buf(),
            recent_files: config.logs.recent_files,
            sessions: SessionStore::new(paths.app_data_dir()?),
        })
    }

    /// Fill missing usernames from the logs.
    ///
    /// Only the newest few log files are read unless `deep` is set. Returns
    /// true when the session store changed.
    pub fn sync_usernames(&self, deep: bool) -> SwitcherResult<bool> {
        let mut sessions = self.sessions.load_sessions()?;
        if sessions.is_empty() {
            info!("no sessions found, skipping username sync");
            return Ok(false);
        }
        if sessions.iter().all(|s| !s.username.is_empty()) {
            info!("no missing usernames in sessions, skipping username sync");
            return Ok(false);
        }

        let mut log_files = find_log_files(&self.logs_dir)?;
        if log_files.is_empty() {
            info!(dir = %self.logs_dir.display(), "no log files found");
            return Ok(false);
        }
        if !deep {
            log_files.truncate(self.recent_files);
        }
        info!(count = log_files.len(), deep, "scanning log files for usernames");

        let mut found = HashMap::new();
        for path in &log_files {
            match File::open(path) {
                Ok(file) => scan_log(BufReader::new(file), &mut found),
                Err(e) => warn!(path = %path.display(), error = %e, "cannot open log file"),
            }
        }
        if found.is_empty() {
            info!("no usernames found in logs");
            return Ok(false);
        }

        let mut changed = false;
        for session in sessions.iter_mut().filter(|s| s.username.is_empty()) {
            if let Some(username) = found.get(&session.user_id) {
                debug!(user_id = %session.user_id, username = %username, "username found");
                session.username = username.clone();
                session.touch();
                changed = true;
            }
        }

        if changed {
            self.sessions.save_sessions(&sessions)?;
            info!("missing usernames filled from logs");
        } else {
            info!("no usernames updated");
        }
        Ok(changed)
    }
}

/// Launcher log files in `dir`, newest first
pub fn find_log_files(dir: &Path) -> SwitcherResult<Vec<PathBuf>> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped_dir)
        .join(LOG_FILE_PATTERN)
        .to_string_lossy()
        .into_owned();
    let entries = glob::glob(&pattern)
        .map_err(|e| SwitcherError::invalid_input(format!("bad log pattern: {e}")))?;

    let mut files: Vec<(SystemTime, PathBuf)> = entries
        .flatten()
        .filter_map(|path| {
            let modified = path.metadata().ok()?.modified().ok()?;
            Some((modified, path))
        })
        .collect();
    files.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Collect `user id -> username` pairs from launch lines; later lines win
pub fn scan_log<R: BufRead>(reader: R, found: &mut HashMap<String, String>) {
    for line in reader.split(b'\n') {
        let Ok(bytes) = line else {
            break;
        };
        let line = String::from_utf8_lossy(&bytes);
        if let Some((user_id, username)) = parse_launch_line(line.trim_end_matches('\r')) {
            found.insert(user_id, username);
        }
    }
}

/// Extract `(user id, username)` from a single log line
pub fn parse_launch_line(line: &str) -> Option<(String, String)> {
    if !line.contains(LAUNCH_MARKER) {
        return None;
    }
    let username = USERNAME.captures(line)?.get(1)?.as_str().to_string();
    let user_id = USER_ID.captures(line)?.get(1)?.as_str().to_string();
    Some((user_id, username))
}
