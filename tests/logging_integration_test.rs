// Integration tests for logging functionality
// Note: this initializes the global subscriber, so it lives in its own test binary

use std::fs;

use obscfg::infrastructure::logging::{LogConfig, LogFormat, LoggerImpl, RotationPolicy};
use tempfile::TempDir;
use tracing::{info, instrument};

#[test]
fn test_logging_to_file() {
    let temp_dir = TempDir::new().unwrap();

    let config = LogConfig {
        level: "info".to_string(),
        format: LogFormat::Json,
        log_dir: Some(temp_dir.path().to_path_buf()),
        rotation: RotationPolicy::Never,
    };

    let logger = temp_env::with_var_unset("RUST_LOG", || LoggerImpl::init(&config)).unwrap();
    assert!(logger.has_file_output());

    info!("Test message 1");
    info!(key = "value", "Test message with fields");
    assert_eq!(instrumented_add(5, 7), 12);
    tracing::debug!("below the configured level");

    // Dropping the guard flushes the non-blocking writer
    drop(logger);

    let contents = fs::read_to_string(temp_dir.path().join("obscfg.log"))
        .expect("Log file should be created");

    assert!(contents.contains("Test message 1"));
    assert!(contents.contains("Test message with fields"));
    assert!(contents.contains("entering instrumented function"));
    assert!(contents.contains("instrumented_add"), "span name should be recorded");
    assert!(!contents.contains("below the configured level"));

    for line in contents.lines() {
        serde_json::from_str::<serde_json::Value>(line).expect("file lines are JSON");
    }

    // A second global subscriber is refused
    assert!(LoggerImpl::init(&LogConfig::default()).is_err());
}

#[instrument]
fn instrumented_add(a: i32, b: i32) -> i32 {
    info!("entering instrumented function");
    a + b
}
