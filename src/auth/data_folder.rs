//! Resolving the signed-in user ID from the launcher's `Saved/Data` folder
//!
//! The launcher writes a per-account file named after the account ID,
//! sometimes prefixed with `OC_`. The most recently modified file belongs to
//! whoever is signed in now.

use crate::error::{SwitcherError, SwitcherResult};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

const OFFLINE_CACHE_PREFIX: &str = "OC_";

/// User ID of the most recently written file in `data_dir`
pub fn current_user_id(data_dir: &Path) -> SwitcherResult<String> {
    let entries = fs::read_dir(data_dir).map_err(|e| {
        SwitcherError::user_id_unavailable(format!("cannot read Epic Data folder: {e}"))
    })?;

    let mut latest: Option<(SystemTime, String)> = None;
    for entry in entries.flatten() {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if latest.as_ref().map_or(true, |(t, _)| modified > *t) {
            latest = Some((modified, entry.file_name().to_string_lossy().into_owned()));
        }
    }

    let (_, filename) = latest.ok_or_else(|| {
        SwitcherError::user_id_unavailable("no files found in Epic Data folder")
    })?;

    user_id_from_filename(&filename).ok_or_else(|| {
        SwitcherError::user_id_unavailable(format!(
            "could not extract user ID from file: {filename}"
        ))
    })
}

/// Strip the extension and the `OC_` prefix; `None` if nothing is left
pub fn user_id_from_filename(filename: &str) -> Option<String> {
    let stem = match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    };
    let id = stem.strip_prefix(OFFLINE_CACHE_PREFIX).unwrap_or(stem);
    (!id.is_empty()).then(|| id.to_string())
}
