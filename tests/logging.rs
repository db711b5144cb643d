use std::fs;

use subtitler::error::SubtitlerError;
use subtitler::logging::{init_logging, LogOptions};
use tempfile::TempDir;
use tracing::info;

#[test]
fn rejects_unknown_level_before_installing_anything() {
    let options = LogOptions {
        level: "chatty".to_string(),
        ..LogOptions::default()
    };
    assert!(matches!(init_logging(&options), Err(SubtitlerError::Logging(_))));
}

#[test]
fn file_logging_writes_plain_records_to_named_log() {
    let dir = TempDir::new().unwrap();
    let options = LogOptions {
        level: "info".to_string(),
        save: true,
        filename: dir.path().join("app").to_string_lossy().into_owned(),
        file_num: 2,
        file_size: 1,
    };

    let guard = init_logging(&options).unwrap();
    assert!(guard.is_some());
    info!("subtitle run finished for talk.mp3");

    let again = init_logging(&LogOptions::default());
    assert!(matches!(again, Err(SubtitlerError::Logging(_))));

    drop(guard);

    let log_path = dir.path().join("app.log");
    assert!(log_path.exists());
    let content = fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("subtitle run finished for talk.mp3"));
    assert!(content.contains("INFO"));
    assert!(!content.contains('\u{1b}'));
}
