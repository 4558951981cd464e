use std::fs;

use tempfile::tempdir;
use tripflow_config::{Config, ConfigManager, LogLevel};

#[test]
fn default_config_has_usable_values() {
    let cfg = Config::default();

    assert!(!cfg.progress_key_prefix.is_empty());
    assert!(cfg.wizard_path.starts_with('/'));
    assert_eq!(cfg.auto_confirm_fallback_days, 3);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    assert_eq!(manager.load().expect("load config"), Config::default());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let cfg = Config {
        app_origin: "https://shop.example".to_string(),
        auto_confirm_fallback_days: 5,
        log_level: LogLevel::Debug,
        progress_dir: Some(dir.path().join("progress")),
        ..Config::default()
    };

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(manager.config_path().ends_with("config/config.json"));
    assert!(!manager.config_path().with_extension("json.tmp").exists());
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"wizard_path": "/trips/review"}"#).expect("write config");

    let loaded = ConfigManager::new(path).load().expect("load config");

    assert_eq!(loaded.wizard_path, "/trips/review");
    assert_eq!(
        loaded.progress_key_prefix,
        Config::default_progress_key_prefix()
    );
}

#[test]
fn malformed_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "{").expect("write config");

    let err = ConfigManager::new(path).load().unwrap_err();
    assert!(err.to_string().starts_with("Serialization error"));
}
