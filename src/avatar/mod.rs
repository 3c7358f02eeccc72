//! Avatar library
//!
//! Avatars are copied into `<app-data>/avatars/` under the hex SHA-256 of
//! their contents, so importing the same picture twice stores it once. Each
//! original gets a 256x256 `_thumb` sibling for list views.

use crate::config::SwitcherConfig;
use crate::error::{SwitcherError, SwitcherResult};
use crate::store::SessionStore;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

pub mod imaging;

pub use imaging::{
    format_byte_size, is_thumbnail_file, thumbnail_filename, CropRect, ImageMetadata,
    THUMBNAIL_SIZE,
};

/// Avatar import, assignment and housekeeping
#[derive(Debug, Clone)]
pub struct AvatarService {
    sessions: SessionStore,
}

impl AvatarService {
    pub fn new(config: &SwitcherConfig) -> SwitcherResult<Self> {
        let paths = config.resolve_paths();
        Ok(Self::with_store(SessionStore::new(paths.app_data_dir()?)))
    }

    pub fn with_store(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    pub fn avatar_dir(&self) -> PathBuf {
        self.sessions.avatar_dir()
    }

    /// Import `source` with an automatic centre crop and assign it to `user_id`.
    ///
    /// Returns the library filename. A thumbnail that cannot be generated (an
    /// SVG, say) is logged and skipped.
    pub fn save_avatar(&self, user_id: &str, source: &Path) -> SwitcherResult<String> {
        require(user_id, "userID")?;

        let (filename, is_new) = self.import(source)?;
        if is_new {
            let dir = self.avatar_dir();
            let thumb = thumbnail_filename(&filename);
            match imaging::generate_thumbnail(&dir.join(&filename), &dir.join(&thumb), THUMBNAIL_SIZE) {
                Ok(()) => info!(thumbnail = %thumb, "generated thumbnail"),
                Err(e) => warn!(error = %e, "failed to generate thumbnail"),
            }
        }

        self.sessions.update_avatar_image(user_id, &filename)?;
        Ok(filename)
    }

    /// Import or re-crop an avatar with a user-chosen crop area.
    ///
    /// An absolute `source` is imported into the library first; anything else
    /// names a file already in the library.
    pub fn save_avatar_with_crop(
        &self,
        user_id: &str,
        source: &str,
        crop: CropRect,
    ) -> SwitcherResult<String> {
        require(user_id, "userID")?;
        require(source, "source")?;

        let dir = self.avatar_dir();
        let source_path = Path::new(source);
        let filename = if source_path.is_absolute() {
            self.import(source_path)?.0
        } else {
            require_library_name(source)?;
            let path = dir.join(source);
            if !path.is_file() {
                return Err(SwitcherError::avatar(format!(
                    "source avatar file not found: {source}"
                )));
            }
            info!(filename = source, "re-cropping existing avatar");
            source.to_string()
        };

        let thumb = thumbnail_filename(&filename);
        imaging::generate_manual_thumbnail(
            &dir.join(&filename),
            &dir.join(&thumb),
            crop,
            THUMBNAIL_SIZE,
        )?;
        info!(thumbnail = %thumb, "generated manual thumbnail");

        self.sessions.update_avatar_image(user_id, &filename)?;
        Ok(filename)
    }

    /// Library originals, sorted, thumbnails excluded
    pub fn available_avatars(&self) -> SwitcherResult<Vec<String>> {
        let dir = self.avatar_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut avatars = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_thumbnail_file(&name) {
                avatars.push(name);
            }
        }
        avatars.sort();
        Ok(avatars)
    }

    /// `data:<mime>;base64,...` for any image file on disk
    pub fn read_image_as_data_url(&self, path: &Path) -> SwitcherResult<String> {
        if path.as_os_str().is_empty() {
            return Err(SwitcherError::invalid_input("path is required"));
        }
        let data = fs::read(path)?;
        let mime = imaging::mime_for_extension(&imaging::extension_of(path));
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        Ok(format!("data:{mime};base64,{encoded}"))
    }

    /// Assign an existing library file to `user_id`
    pub fn set_avatar(&self, user_id: &str, filename: &str) -> SwitcherResult<()> {
        require(user_id, "userID")?;
        require_library_name(filename)?;
        if !self.avatar_dir().join(filename).is_file() {
            return Err(SwitcherError::avatar(format!(
                "avatar file not found: {filename}"
            )));
        }
        self.sessions.update_avatar_image(user_id, filename)
    }

    pub fn set_avatar_color(&self, user_id: &str, color: &str) -> SwitcherResult<()> {
        require(user_id, "userID")?;
        self.sessions.update_avatar_color(user_id, color)
    }

    /// Clear the user's avatar; the library file stays
    pub fn remove_avatar(&self, user_id: &str) -> SwitcherResult<()> {
        require(user_id, "userID")?;
        self.sessions.update_avatar_image(user_id, "")
    }

    /// Delete a library file and, best effort, its thumbnail
    pub fn delete_avatar_file(&self, filename: &str) -> SwitcherResult<()> {
        require_library_name(filename)?;
        let dir = self.avatar_dir();
        let path = dir.join(filename);
        if !path.is_file() {
            return Err(SwitcherError::avatar(format!(
                "avatar file not found: {filename}"
            )));
        }

        info!(filename, "deleting avatar file");
        fs::remove_file(&path)?;

        let thumb = dir.join(thumbnail_filename(filename));
        if thumb.exists() {
            if let Err(e) = fs::remove_file(&thumb) {
                warn!(error = %e, "failed to delete thumbnail");
            }
        }
        Ok(())
    }

    pub fn image_metadata(&self, filename: &str) -> SwitcherResult<ImageMetadata> {
        require_library_name(filename)?;
        imaging::read_metadata(&self.avatar_dir().join(filename), filename)
    }

    /// Copy `source` into the library unless an identical file is there.
    ///
    /// Returns the library filename and whether it was newly written.
    fn import(&self, source: &Path) -> SwitcherResult<(String, bool)> {
        let data = fs::read(source).map_err(|e| {
            SwitcherError::avatar(format!("failed to read selected file: {e}"))
        })?;
        let hash = content_hash(&data);
        let filename = format!("{hash}{}", original_extension(source));
        debug!(source = %source.display(), hash = %hash, "hashed avatar source");

        let dir = self.avatar_dir();
        let dest = dir.join(&filename);
        if dest.exists() {
            info!(filename = %filename, "using existing avatar (deduplicated)");
            return Ok((filename, false));
        }

        fs::create_dir_all(&dir)?;
        fs::write(&dest, &data)?;
        info!(filename = %filename, "saved new unique avatar");
        Ok((filename, true))
    }
}

/// Hex SHA-256 of `data`
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Extension of `path` as written, dot included
fn original_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

fn require(value: &str, name: &str) -> SwitcherResult<()> {
    if value.is_empty() {
        return Err(SwitcherError::invalid_input(format!("{name} is required")));
    }
    Ok(())
}

/// A library filename must be one plain path component, never `..` or a path
fn require_library_name(filename: &str) -> SwitcherResult<()> {
    require(filename, "filename")?;
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(SwitcherError::invalid_input(format!(
            "not an avatar library filename: {filename}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_hex_sha256() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_hash(b"abc").len(), 64);
    }

    #[test]
    fn test_original_extension_keeps_case() {
        assert_eq!(original_extension(Path::new("/x/Photo.JPG")), ".JPG");
        assert_eq!(original_extension(Path::new("/x/photo")), "");
    }

    #[test]
    fn test_library_name_is_single_component() {
        assert!(require_library_name("abc.png").is_ok());
        assert!(require_library_name("").is_err());
        assert!(require_library_name("..").is_err());
        assert!(require_library_name("../login_sessions.json").is_err());
        assert!(require_library_name("sub/abc.png").is_err());
        assert!(require_library_name("/etc/passwd").is_err());
        assert!(require_library_name("./abc.png").is_err());
    }

    #[test]
    fn test_require() {
        assert!(require("", "userID").is_err());
        assert!(require("u", "userID").is_ok());
    }
}
