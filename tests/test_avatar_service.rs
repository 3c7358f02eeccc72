//! Avatar library tests
//!
//! Real PNG/JPEG files are generated on the fly with the image crate.


use epic_switcher::avatar::{thumbnail_filename, CropRect, THUMBNAIL_SIZE};
use epic_switcher::error::SwitcherError;
use epic_switcher::{AvatarService, LoginSession, SessionStore};
use image::{GenericImageView, Rgb, RgbImage};
use proptest::prelude::*;
use std::path::{Path, PathBuf};
use test_helpers::{token, Fixture};

fn setup() -> (Fixture, AvatarService, SessionStore) {
    let fixture = Fixture::new();
    let store = SessionStore::new(&fixture.app_dir());
    store
        .add_or_update(LoginSession::detected("0a1b2c3d", token('a')))
        .unwrap();
    let service = AvatarService::new(&fixture.config).unwrap();
    (fixture, service, store)
}

fn write_picture(dir: &Path, name: &str, width: u32, height: u32, shade: u8) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb([shade, 40, 200]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn test_save_avatar_imports_assigns_and_thumbnails() {
    let (fixture, service, store) = setup();
    let source = write_picture(fixture.root(), "me.png", 400, 300, 10);

    let filename = service.save_avatar("0a1b2c3d", &source).unwrap();

    assert_eq!(filename.len(), 64 + ".png".len());
    assert!(filename.ends_with(".png"));
    let session = store.find("0a1b2c3d").unwrap().unwrap();
    assert_eq!(session.avatar_image, filename);

    let thumb = image::open(service.avatar_dir().join(thumbnail_filename(&filename))).unwrap();
    assert_eq!(thumb.dimensions(), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
}

#[test]
fn test_identical_images_are_stored_once() {
    let (fixture, service, _store) = setup();
    let first = write_picture(fixture.root(), "a.png", 64, 64, 1);
    let copy = fixture.root().join("b.png");
    std::fs::copy(&first, &copy).unwrap();

    let a = service.save_avatar("0a1b2c3d", &first).unwrap();
    let b = service.save_avatar("0a1b2c3d", &copy).unwrap();

    assert_eq!(a, b);
    assert_eq!(service.available_avatars().unwrap(), vec![a]);
}

#[test]
fn test_available_avatars_hides_thumbnails_and_sorts() {
    let (fixture, service, _store) = setup();
    for shade in [1u8, 2, 3] {
        let src = write_picture(fixture.root(), &format!("{shade}.png"), 32, 32, shade);
        service.save_avatar("0a1b2c3d", &src).unwrap();
    }

    let avatars = service.available_avatars().unwrap();
    assert_eq!(avatars.len(), 3);
    assert!(avatars.iter().all(|name| !name.contains("_thumb")));
    let mut sorted = avatars.clone();
    sorted.sort();
    assert_eq!(avatars, sorted);
}

#[test]
fn test_available_avatars_without_library_is_empty() {
    let (_fixture, service, _store) = setup();
    assert!(service.available_avatars().unwrap().is_empty());
}

#[test]
fn test_crop_existing_library_file() {
    let (fixture, service, store) = setup();
    let src = write_picture(fixture.root(), "wide.jpg", 600, 200, 50);
    let filename = service.save_avatar("0a1b2c3d", &src).unwrap();
    service.remove_avatar("0a1b2c3d").unwrap();

    let cropped = service
        .save_avatar_with_crop("0a1b2c3d", &filename, CropRect::new(100, 0, 200, 200))
        .unwrap();

    assert_eq!(cropped, filename);
    assert_eq!(store.find("0a1b2c3d").unwrap().unwrap().avatar_image, filename);
    let thumb = image::open(service.avatar_dir().join(thumbnail_filename(&filename))).unwrap();
    assert_eq!(thumb.dimensions(), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
}

#[test]
fn test_crop_with_absolute_source_imports_first() {
    let (fixture, service, _store) = setup();
    let src = write_picture(fixture.root(), "new.png", 300, 300, 90);

    let filename = service
        .save_avatar_with_crop(
            "0a1b2c3d",
            &src.to_string_lossy(),
            CropRect::new(0, 0, 150, 150),
        )
        .unwrap();

    assert!(service.avatar_dir().join(&filename).is_file());
}

#[test]
fn test_crop_rejects_bad_rectangles_and_unknown_files() {
    let (fixture, service, _store) = setup();
    let src = write_picture(fixture.root(), "small.png", 50, 50, 7);
    let filename = service.save_avatar("0a1b2c3d", &src).unwrap();

    assert!(matches!(
        service.save_avatar_with_crop("0a1b2c3d", &filename, CropRect::new(0, 0, 0, 10)),
        Err(SwitcherError::InvalidInput { .. })
    ));
    assert!(matches!(
        service.save_avatar_with_crop("0a1b2c3d", &filename, CropRect::new(80, 0, 10, 10)),
        Err(SwitcherError::InvalidInput { .. })
    ));
    assert!(matches!(
        service.save_avatar_with_crop("0a1b2c3d", "missing.png", CropRect::new(0, 0, 10, 10)),
        Err(SwitcherError::Avatar { .. })
    ));
}

#[test]
fn test_set_avatar_requires_library_file() {
    let (fixture, service, store) = setup();
    assert!(service.set_avatar("0a1b2c3d", "nope.png").is_err());

    let src = write_picture(fixture.root(), "pic.png", 20, 20, 3);
    let filename = service.save_avatar("0a1b2c3d", &src).unwrap();
    service.remove_avatar("0a1b2c3d").unwrap();
    assert!(store.find("0a1b2c3d").unwrap().unwrap().avatar_image.is_empty());

    service.set_avatar("0a1b2c3d", &filename).unwrap();
    assert_eq!(store.find("0a1b2c3d").unwrap().unwrap().avatar_image, filename);
}

#[test]
fn test_avatar_color_is_stored() {
    let (_fixture, service, store) = setup();
    service.set_avatar_color("0a1b2c3d", "#ff8800").unwrap();
    assert_eq!(
        store.find("0a1b2c3d").unwrap().unwrap().avatar_color,
        "#ff8800"
    );
    assert!(service.set_avatar_color("", "#000000").is_err());
}

#[test]
fn test_delete_avatar_file_removes_thumbnail() {
    let (fixture, service, _store) = setup();
    let src = write_picture(fixture.root(), "gone.png", 40, 40, 9);
    let filename = service.save_avatar("0a1b2c3d", &src).unwrap();
    let thumb = service.avatar_dir().join(thumbnail_filename(&filename));
    assert!(thumb.exists());

    service.delete_avatar_file(&filename).unwrap();

    assert!(!service.avatar_dir().join(&filename).exists());
    assert!(!thumb.exists());
    assert!(service.delete_avatar_file(&filename).is_err());
}

#[test]
fn test_library_operations_stay_inside_avatar_dir() {
    let (_fixture, service, store) = setup();
    let escape = "../login_sessions.json";

    assert!(matches!(
        service.delete_avatar_file(escape),
        Err(SwitcherError::InvalidInput { .. })
    ));
    assert!(store.file_path().exists());
    assert_eq!(store.load_sessions().unwrap().len(), 1);

    assert!(matches!(
        service.set_avatar("0a1b2c3d", escape),
        Err(SwitcherError::InvalidInput { .. })
    ));
    assert!(matches!(
        service.image_metadata(escape),
        Err(SwitcherError::InvalidInput { .. })
    ));
    assert!(matches!(
        service.save_avatar_with_crop("0a1b2c3d", escape, CropRect::new(0, 0, 10, 10)),
        Err(SwitcherError::InvalidInput { .. })
    ));
}

#[test]
fn test_image_metadata_reports_header_details() {
    let (fixture, service, _store) = setup();
    let src = write_picture(fixture.root(), "meta.png", 120, 80, 4);
    let filename = service.save_avatar("0a1b2c3d", &src).unwrap();

    let metadata = service.image_metadata(&filename).unwrap();

    assert_eq!((metadata.width, metadata.height), (120, 80));
    assert_eq!(metadata.format, "png");
    assert_eq!(metadata.content_type, "image/png");
    assert!(metadata.size > 0);
}

#[test]
fn test_svg_metadata_without_decoding() {
    let (fixture, service, _store) = setup();
    let svg = fixture.root().join("logo.svg");
    std::fs::write(&svg, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();

    // The thumbnail fails for SVG, but the import itself succeeds
    let filename = service.save_avatar("0a1b2c3d", &svg).unwrap();
    let metadata = service.image_metadata(&filename).unwrap();

    assert_eq!(metadata.format, "svg");
    assert_eq!((metadata.width, metadata.height), (0, 0));
}

#[test]
fn test_data_url_uses_extension_mime() {
    let (fixture, service, _store) = setup();
    let src = write_picture(fixture.root(), "inline.png", 4, 4, 0);

    let url = service.read_image_as_data_url(&src).unwrap();

    assert!(url.starts_with("data:image/png;base64,"));
    assert!(service.read_image_as_data_url(Path::new("")).is_err());
}

proptest! {
    #[test]
    fn test_thumbnail_name_keeps_extension(stem in "[a-f0-9]{1,64}", ext in "(png|jpg|jpeg|gif|webp)") {
        let filename = format!("{stem}.{ext}");
        let thumb = thumbnail_filename(&filename);
        let expected_suffix = format!("_thumb.{}", ext);
        prop_assert!(thumb.ends_with(&expected_suffix));
        prop_assert!(thumb.starts_with(&stem));
        prop_assert!(epic_switcher::avatar::is_thumbnail_file(&thumb));
        prop_assert!(!epic_switcher::avatar::is_thumbnail_file(&filename));
    }
}
