//! Username recovery from launcher logs


use epic_switcher::logreader::find_log_files;
use epic_switcher::{LogReaderService, LoginSession, SessionStore};
use test_helpers::{launch_line, token, Fixture};

fn store(fixture: &Fixture) -> SessionStore {
    SessionStore::new(&fixture.app_dir())
}

fn seed_sessions(fixture: &Fixture, user_ids: &[&str]) {
    let store = store(fixture);
    for (i, user_id) in user_ids.iter().enumerate() {
        let seed = char::from(b'a' + i as u8);
        store
            .add_or_update(LoginSession::detected(*user_id, token(seed)))
            .unwrap();
    }
}

#[test]
fn test_fills_missing_username_from_recent_log() {
    let fixture = Fixture::new();
    seed_sessions(&fixture, &["0a1b2c3d"]);
    fixture.write_log(
        "EpicGamesLauncher.log",
        &format!("noise\n{}more noise\n", launch_line("PlayerOne", "0a1b2c3d")),
        0,
    );

    let service = LogReaderService::new(&fixture.config).unwrap();
    assert!(service.sync_usernames(false).unwrap());

    let session = store(&fixture).find("0a1b2c3d").unwrap().unwrap();
    assert_eq!(session.username, "PlayerOne");
}

#[test]
fn test_existing_usernames_are_not_overwritten() {
    let fixture = Fixture::new();
    store(&fixture)
        .add_or_update(LoginSession {
            username: "Original".to_string(),
            ..LoginSession::detected("0a1b2c3d", token('a'))
        })
        .unwrap();
    fixture.write_log(
        "EpicGamesLauncher.log",
        &launch_line("Renamed", "0a1b2c3d"),
        0,
    );

    let service = LogReaderService::new(&fixture.config).unwrap();
    assert!(!service.sync_usernames(true).unwrap());
    assert_eq!(
        store(&fixture).find("0a1b2c3d").unwrap().unwrap().username,
        "Original"
    );
}

#[test]
fn test_old_logs_need_deep_scan() {
    let fixture = Fixture::new();
    seed_sessions(&fixture, &["00ff"]);
    fixture.write_log(
        "EpicGamesLauncher-backup-1.log",
        &launch_line("Veteran", "00ff"),
        400,
    );
    for (i, age) in [10u64, 20, 30].iter().enumerate() {
        fixture.write_log(
            &format!("EpicGamesLauncher-backup-new{i}.log"),
            "nothing to see\n",
            *age,
        );
    }

    let service = LogReaderService::new(&fixture.config).unwrap();
    assert!(!service.sync_usernames(false).unwrap());
    assert!(service.sync_usernames(true).unwrap());
    assert_eq!(
        store(&fixture).find("00ff").unwrap().unwrap().username,
        "Veteran"
    );
}

#[test]
fn test_no_sessions_or_no_logs_is_not_an_error() {
    let fixture = Fixture::new();
    let service = LogReaderService::new(&fixture.config).unwrap();
    assert!(!service.sync_usernames(false).unwrap());

    seed_sessions(&fixture, &["0a1b2c3d"]);
    assert!(!service.sync_usernames(true).unwrap());
}

#[test]
fn test_find_log_files_filters_and_orders_newest_first() {
    let fixture = Fixture::new();
    fixture.write_log("EpicGamesLauncher.log", "", 0);
    fixture.write_log("EpicGamesLauncher-backup-2024.log", "", 100);
    fixture.write_log("SelfUpdate.log", "", 0);
    fixture.write_log("EpicGamesLauncher.txt", "", 0);

    let files = find_log_files(&fixture.root().join("Logs")).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(
        names,
        vec!["EpicGamesLauncher.log", "EpicGamesLauncher-backup-2024.log"]
    );
}

#[test]
fn test_crlf_and_invalid_utf8_lines_are_tolerated() {
    let fixture = Fixture::new();
    seed_sessions(&fixture, &["beef"]);
    let mut contents = b"\xff\xfe garbage\r\n".to_vec();
    contents.extend_from_slice(launch_line("Crlf", "beef").replace('\n', "\r\n").as_bytes());
    let path = fixture.root().join("Logs").join("EpicGamesLauncher.log");
    std::fs::write(&path, contents).unwrap();

    let service = LogReaderService::new(&fixture.config).unwrap();
    assert!(service.sync_usernames(false).unwrap());
    assert_eq!(store(&fixture).find("beef").unwrap().unwrap().username, "Crlf");
}
