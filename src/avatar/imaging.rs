//! Thumbnail generation and image inspection

use crate::error::{SwitcherError, SwitcherResult};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use serde::Serialize;
use std::path::Path;

/// Edge length of the square thumbnails
pub const THUMBNAIL_SIZE: u32 = 256;

const THUMB_SUFFIX: &str = "_thumb";

/// Pixel rectangle selected by the user for a manual crop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Technical details of an avatar file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub filename: String,
    pub size: u64,
    pub format_size: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub content_type: String,
}

/// `abc.jpg` -> `abc_thumb.jpg`
pub fn thumbnail_filename(filename: &str) -> String {
    let (stem, ext) = split_extension(filename);
    format!("{stem}{THUMB_SUFFIX}{ext}")
}

/// Whether `filename` names a generated thumbnail
pub fn is_thumbnail_file(filename: &str) -> bool {
    split_extension(filename).0.ends_with(THUMB_SUFFIX)
}

/// Split at the last dot; the extension keeps its dot
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) => filename.split_at(idx),
        None => (filename, ""),
    }
}

/// Lower-cased extension of `path` including the dot, or empty
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// MIME type for a data URL, by extension; unknown types fall back to JPEG
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        ".png" => "image/png",
        ".webp" => "image/webp",
        ".gif" => "image/gif",
        ".svg" => "image/svg+xml",
        _ => "image/jpeg",
    }
}

/// Content type reported in metadata; unknown types stay unknown
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".webp" => "image/webp",
        ".gif" => "image/gif",
        ".svg" => "image/svg+xml",
        _ => "image/unknown",
    }
}

/// Human readable size in base-1024 units: `512 B`, `1.5 KB`, `2.0 MB`
pub fn format_byte_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}

/// Square, centre-cropped thumbnail of `src` written to `dest`
pub fn generate_thumbnail(src: &Path, dest: &Path, size: u32) -> SwitcherResult<()> {
    let img = image::open(src)?;
    let thumb = img.resize_to_fill(size, size, FilterType::Lanczos3);
    save_image(&thumb, dest)
}

/// Crop `rect` out of `src`, scale it to `size`x`size` and write it to `dest`
pub fn generate_manual_thumbnail(
    src: &Path,
    dest: &Path,
    rect: CropRect,
    size: u32,
) -> SwitcherResult<()> {
    if rect.width == 0 || rect.height == 0 {
        return Err(SwitcherError::invalid_input(
            "crop area must have a non-zero width and height",
        ));
    }
    let img = image::open(src)?;
    let (w, h) = img.dimensions();
    if rect.x >= w || rect.y >= h {
        return Err(SwitcherError::invalid_input(format!(
            "crop origin ({}, {}) lies outside the {w}x{h} image",
            rect.x, rect.y
        )));
    }

    let cropped = img.crop_imm(rect.x, rect.y, rect.width, rect.height);
    let thumb = cropped.resize_exact(size, size, FilterType::Lanczos3);
    save_image(&thumb, dest)
}

/// Save in the format implied by the extension of `dest`
fn save_image(img: &DynamicImage, dest: &Path) -> SwitcherResult<()> {
    match ImageFormat::from_path(dest) {
        // JPEG has no alpha channel
        Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgb8(img.to_rgb8()).save(dest)?,
        _ => img.save(dest)?,
    }
    Ok(())
}

/// Read dimensions and format from the file header only
pub fn read_metadata(path: &Path, filename: &str) -> SwitcherResult<ImageMetadata> {
    let size = std::fs::metadata(path)
        .map_err(|e| SwitcherError::avatar(format!("failed to stat image file: {e}")))?
        .len();
    let ext = extension_of(Path::new(filename));

    if ext == ".svg" {
        // No raster header to read
        return Ok(ImageMetadata {
            filename: filename.to_string(),
            size,
            format_size: format_byte_size(size),
            width: 0,
            height: 0,
            format: "svg".to_string(),
            content_type: content_type_for_extension(&ext).to_string(),
        });
    }

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .map(format_name)
        .ok_or_else(|| SwitcherError::avatar(format!("unrecognised image format: {filename}")))?;
    let (width, height) = reader.into_dimensions()?;

    Ok(ImageMetadata {
        filename: filename.to_string(),
        size,
        format_size: format_byte_size(size),
        width,
        height,
        format: format.to_string(),
        content_type: content_type_for_extension(&ext).to_string(),
    })
}

fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Ico => "ico",
        ImageFormat::Tiff => "tiff",
        _ => "other",
    }
}
