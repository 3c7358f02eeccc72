//! Configuration for the account switcher
//!
//! Every key is optional. Paths that are not set in the TOML file are
//! resolved from the operating system the same way the launcher lays out its
//! own files, so a fresh install runs without any configuration at all.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Folder created under the user cache directory for the switcher's own data
pub const APP_FOLDER_NAME: &str = "Epic Moka Switcher";

/// Launcher executable image name
pub const DEFAULT_PROCESS_NAME: &str = "EpicGamesLauncher.exe";

const DEFAULT_LAUNCHER_PATH: &str =
    r"C:\Program Files (x86)\Epic Games\Launcher\Portal\Binaries\Win32\EpicGamesLauncher.exe";

/// Main switcher configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SwitcherConfig {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub launcher: LauncherSection,
    #[serde(default)]
    pub logs: LogsSection,
}

/// Path overrides; `None` means "resolve from the OS"
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathsSection {
    /// Where login_sessions.json, ignored_sessions.json and avatars/ live
    pub app_data_dir: Option<PathBuf>,
    /// The launcher's GameUserSettings.ini
    pub session_file: Option<PathBuf>,
    /// The launcher's Saved/Data folder, used to find the current user ID
    pub epic_data_dir: Option<PathBuf>,
    /// The launcher's Saved/Logs folder
    pub logs_dir: Option<PathBuf>,
    /// Executable started after a switch
    pub launcher_path: Option<PathBuf>,
}

/// Launcher process handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LauncherSection {
    #[serde(default = "default_process_name")]
    pub process_name: String,
    /// How long to wait for the launcher to exit (default: 8000)
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    /// Interval between process checks while waiting (default: 250)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for LauncherSection {
    fn default() -> Self {
        Self {
            process_name: default_process_name(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl LauncherSection {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Launcher log scanning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogsSection {
    /// Log files scanned by a normal (non-deep) username sync
    #[serde(default = "default_recent_files")]
    pub recent_files: usize,
}

impl Default for LogsSection {
    fn default() -> Self {
        Self {
            recent_files: default_recent_files(),
        }
    }
}

fn default_process_name() -> String {
    DEFAULT_PROCESS_NAME.to_string()
}

fn default_shutdown_timeout_ms() -> u64 {
    8000
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_recent_files() -> usize {
    3
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SwitcherConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SwitcherConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.launcher.process_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "launcher.process_name must not be empty".to_string(),
            ));
        }
        if self.launcher.shutdown_timeout_ms == 0 || self.launcher.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "launcher timeouts must be greater than zero".to_string(),
            ));
        }
        if self.launcher.poll_interval_ms > self.launcher.shutdown_timeout_ms {
            return Err(ConfigError::InvalidConfig(format!(
                "launcher.poll_interval_ms ({}) exceeds shutdown_timeout_ms ({})",
                self.launcher.poll_interval_ms, self.launcher.shutdown_timeout_ms
            )));
        }
        if self.logs.recent_files == 0 {
            return Err(ConfigError::InvalidConfig(
                "logs.recent_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve every path, falling back to OS defaults
    pub fn resolve_paths(&self) -> ResolvedPaths {
        let local_app_data = std::env::var_os("LOCALAPPDATA")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let epic_saved = local_app_data
            .as_ref()
            .map(|dir| dir.join("EpicGamesLauncher").join("Saved"));

        ResolvedPaths {
            app_data_dir: self
                .paths
                .app_data_dir
                .clone()
                .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_FOLDER_NAME))),
            session_file: self.paths.session_file.clone().or_else(|| {
                epic_saved.as_ref().map(|saved| {
                    saved
                        .join("Config")
                        .join("Windows")
                        .join("GameUserSettings.ini")
                })
            }),
            epic_data_dir: self
                .paths
                .epic_data_dir
                .clone()
                .or_else(|| epic_saved.as_ref().map(|saved| saved.join("Data"))),
            logs_dir: self.paths.logs_dir.clone().or_else(|| {
                dirs::home_dir().map(|home| {
                    home.join("AppData")
                        .join("Local")
                        .join("EpicGamesLauncher")
                        .join("Saved")
                        .join("Logs")
                })
            }),
            launcher_path: self
                .paths
                .launcher_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LAUNCHER_PATH)),
        }
    }

    /// Create a configuration rooted entirely inside `root`, for tests
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            paths: PathsSection {
                app_data_dir: Some(root.join("app")),
                session_file: Some(root.join("GameUserSettings.ini")),
                epic_data_dir: Some(root.join("Data")),
                logs_dir: Some(root.join("Logs")),
                launcher_path: Some(root.join("EpicGamesLauncher.exe")),
            },
            launcher: LauncherSection {
                shutdown_timeout_ms: 500,
                poll_interval_ms: 10,
                ..LauncherSection::default()
            },
            logs: LogsSection::default(),
        }
    }
}

/// Paths after defaults have been applied
///
/// Entries stay optional where the OS gives no answer (for example
/// `LOCALAPPDATA` unset); operations that need them report
/// [`crate::SwitcherError::PathUnavailable`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPaths {
    pub app_data_dir: Option<PathBuf>,
    pub session_file: Option<PathBuf>,
    pub epic_data_dir: Option<PathBuf>,
    pub logs_dir: Option<PathBuf>,
    pub launcher_path: PathBuf,
}

impl ResolvedPaths {
    pub fn app_data_dir(&self) -> crate::SwitcherResult<&Path> {
        self.app_data_dir
            .as_deref()
            .ok_or_else(|| crate::SwitcherError::path_unavailable("app data directory"))
    }

    pub fn session_file(&self) -> crate::SwitcherResult<&Path> {
        self.session_file
            .as_deref()
            .ok_or_else(|| crate::SwitcherError::path_unavailable("session (.ini) file"))
    }

    pub fn epic_data_dir(&self) -> crate::SwitcherResult<&Path> {
        self.epic_data_dir
            .as_deref()
            .ok_or_else(|| crate::SwitcherError::path_unavailable("Epic Data folder"))
    }

    pub fn logs_dir(&self) -> crate::SwitcherResult<&Path> {
        self.logs_dir
            .as_deref()
            .ok_or_else(|| crate::SwitcherError::path_unavailable("Epic logs folder"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SwitcherConfig::from_toml_str("").unwrap();
        assert_eq!(config.launcher.process_name, "EpicGamesLauncher.exe");
        assert_eq!(config.launcher.shutdown_timeout_ms, 8000);
        assert_eq!(config.launcher.poll_interval_ms, 250);
        assert_eq!(config.logs.recent_files, 3);
        assert_eq!(config.paths, PathsSection::default());
    }

    #[test]
    fn test_full_config() {
        let toml_content = r#"
[paths]
app_data_dir = "/tmp/switcher"
session_file = "/tmp/epic/GameUserSettings.ini"
launcher_path = "/opt/epic/launcher"

[launcher]
process_name = "Launcher.exe"
shutdown_timeout_ms = 3000
poll_interval_ms = 100

[logs]
recent_files = 5
"#;

        let config = SwitcherConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.paths.app_data_dir,
            Some(PathBuf::from("/tmp/switcher"))
        );
        assert_eq!(config.launcher.process_name, "Launcher.exe");
        assert_eq!(config.launcher.shutdown_timeout(), Duration::from_secs(3));
        assert_eq!(config.launcher.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.logs.recent_files, 5);

        let paths = config.resolve_paths();
        assert_eq!(
            paths.session_file().unwrap(),
            Path::new("/tmp/epic/GameUserSettings.ini")
        );
        assert_eq!(paths.launcher_path, PathBuf::from("/opt/epic/launcher"));
    }

    #[test]
    fn test_poll_interval_longer_than_timeout_is_rejected() {
        let toml_content = r#"
[launcher]
shutdown_timeout_ms = 100
poll_interval_ms = 200
"#;
        let result = SwitcherConfig::from_toml_str(toml_content);
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_recent_files_is_rejected() {
        let result = SwitcherConfig::from_toml_str("[logs]\nrecent_files = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_rooted_config_resolves_inside_root() {
        let root = Path::new("/tmp/root");
        let paths = SwitcherConfig::rooted_at(root).resolve_paths();

        assert_eq!(paths.app_data_dir().unwrap(), root.join("app"));
        assert_eq!(paths.epic_data_dir().unwrap(), root.join("Data"));
        assert_eq!(paths.logs_dir().unwrap(), root.join("Logs"));
    }
}
