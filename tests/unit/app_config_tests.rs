/*!
 * Tests for app configuration functionality
 */

use ronyaku::app_config::{Config, LogLevel};

use crate::common::{create_temp_dir, create_test_file};

/// Test that the default configuration validates
#[test]
fn test_default_config_shouldValidate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "ja");
    assert_eq!(config.translator, "deepl");
    assert_eq!(config.gateway, "useless");
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test saving and reloading a configuration round-trips
#[test]
fn test_save_and_from_file_shouldRoundTrip() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.translator = "google".to_string();
    config.journal = "arxiv".to_string();
    config.translation.max_chars = 1234;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.translator, "google");
    assert_eq!(loaded.journal, "arxiv");
    assert_eq!(loaded.translation.max_chars, 1234);
}

/// Test that a minimal config file picks up defaults for missing fields
#[test]
fn test_from_file_withMinimalJson_shouldApplyDefaults() {
    let dir = create_temp_dir().unwrap();
    let content = r#"{ "source_language": "en", "target_language": "ja" }"#;
    let path = create_test_file(&dir.path().to_path_buf(), "conf.json", content).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.translator, "deepl");
    assert_eq!(config.translation.poll_trials, 30);
    assert_eq!(config.translation.max_chars, 5000);
    assert_eq!(config.session.load_wait_secs, 3);
}

/// Test that an unknown translator fails validation
#[test]
fn test_validate_withUnknownTranslator_shouldFail() {
    let mut config = Config::default();
    config.translator = "babelfish".to_string();
    assert!(config.validate().is_err());
}

/// Test that an unknown gateway fails validation
#[test]
fn test_validate_withUnknownGateway_shouldFail() {
    let mut config = Config::default();
    config.gateway = "hogwarts".to_string();
    assert!(config.validate().is_err());
}

/// Test that an unknown journal override fails validation
#[test]
fn test_validate_withUnknownJournal_shouldFail() {
    let mut config = Config::default();
    config.journal = "unsupported-journal".to_string();
    assert!(config.validate().is_err());
}

/// Test that degenerate chunking or polling settings fail validation
#[test]
fn test_validate_withDegenerateSettings_shouldFail() {
    let mut config = Config::default();
    config.translation.max_chars = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.poll_trials = 0;
    assert!(config.validate().is_err());
}

/// Test that a missing config file is reported as an error
#[test]
fn test_from_file_withMissingFile_shouldFail() {
    assert!(Config::from_file("/no/such/conf.json").is_err());
}
