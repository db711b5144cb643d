use subtitler::logging::{init_logging, LogOptions};
use tracing::info;

#[test]
fn console_logging_returns_no_guard() {
    let options = LogOptions {
        level: "debug".to_string(),
        ..LogOptions::default()
    };

    let guard = init_logging(&options).unwrap();
    assert!(guard.is_none());
    info!("console logging is up");
}
