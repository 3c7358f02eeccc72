//! Revealing the switcher's and the launcher's files in the OS file manager

use crate::config::ResolvedPaths;
use crate::error::{SwitcherError, SwitcherResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use tracing::info;

/// Locations that can be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKey {
    AppData,
    SessionFile,
    Logs,
}

impl FromStr for DirectoryKey {
    type Err = SwitcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appData" => Ok(Self::AppData),
            "sessionFile" => Ok(Self::SessionFile),
            "logs" => Ok(Self::Logs),
            other => Err(SwitcherError::invalid_input(format!(
                "unknown directory key: {other}"
            ))),
        }
    }
}

/// Desktop family deciding which file manager command to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Desktop {
    Windows,
    MacOs,
    Other,
}

impl Desktop {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }
}

/// Program and arguments that show `target` in the file manager.
///
/// Files are highlighted where the platform supports it; elsewhere the
/// containing folder is opened.
pub fn open_command(desktop: Desktop, target: &Path) -> (&'static str, Vec<PathBuf>) {
    match desktop {
        Desktop::Windows if target.extension().is_none() => {
            ("explorer", vec![target.to_path_buf()])
        }
        Desktop::Windows => (
            "explorer",
            vec![PathBuf::from("/select,"), target.to_path_buf()],
        ),
        Desktop::MacOs => ("open", vec![PathBuf::from("-R"), target.to_path_buf()]),
        Desktop::Other => (
            "xdg-open",
            vec![target
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| target.to_path_buf())],
        ),
    }
}

/// Resolve the path behind `key`
pub fn target_path(paths: &ResolvedPaths, key: DirectoryKey) -> SwitcherResult<PathBuf> {
    let path = match key {
        DirectoryKey::AppData => paths.app_data_dir()?,
        DirectoryKey::SessionFile => paths.session_file()?,
        DirectoryKey::Logs => paths.logs_dir()?,
    };
    Ok(path.to_path_buf())
}

/// Open a known folder or highlight a known file
pub fn open_directory(paths: &ResolvedPaths, key: DirectoryKey) -> SwitcherResult<()> {
    let target = target_path(paths, key)?;
    let (program, args) = open_command(Desktop::current(), &target);
    info!(program, target = %target.display(), "opening in file manager");

    Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!("appData".parse::<DirectoryKey>().unwrap(), DirectoryKey::AppData);
        assert_eq!(
            "sessionFile".parse::<DirectoryKey>().unwrap(),
            DirectoryKey::SessionFile
        );
        assert_eq!("logs".parse::<DirectoryKey>().unwrap(), DirectoryKey::Logs);
        assert!("desktop".parse::<DirectoryKey>().is_err());
    }

    #[test]
    fn test_windows_folder_and_file() {
        let (program, args) = open_command(Desktop::Windows, Path::new(r"C:\Data\Logs"));
        assert_eq!(program, "explorer");
        assert_eq!(args.len(), 1);

        let (_, args) = open_command(Desktop::Windows, Path::new(r"C:\Data\Settings.ini"));
        assert_eq!(args[0], PathBuf::from("/select,"));
    }

    #[test]
    fn test_macos_reveals() {
        let (program, args) = open_command(Desktop::MacOs, Path::new("/tmp/a.ini"));
        assert_eq!(program, "open");
        assert_eq!(args, vec![PathBuf::from("-R"), PathBuf::from("/tmp/a.ini")]);
    }

    #[test]
    fn test_other_opens_parent() {
        let (program, args) = open_command(Desktop::Other, Path::new("/tmp/dir/a.ini"));
        assert_eq!(program, "xdg-open");
        assert_eq!(args, vec![PathBuf::from("/tmp/dir")]);
    }

    #[test]
    fn test_other_opens_parent_of_folder() {
        let (_, args) = open_command(
            Desktop::Other,
            Path::new("/home/u/.cache/Epic Moka Switcher"),
        );
        assert_eq!(args, vec![PathBuf::from("/home/u/.cache")]);
    }
}
