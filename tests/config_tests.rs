//! Tests for configuration loading, saving, and migration

use std::fs;
use std::path::PathBuf;
use win_tray_controller::settings::config::{AppConfig, CONFIG_VERSION};
use win_tray_controller::settings::ConfigManager;

fn scratch_config(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "win_tray_controller_config_{}_{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir.join("config.toml")
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.config_version, CONFIG_VERSION);
    assert!(config.general.language.is_none());
    assert!(config.tray.title.is_none());
    assert!(config.tray.tooltip.is_none());
    assert_eq!(config.tray.callback_offset, 1);
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.max_file_size, 5 * 1024 * 1024);
    assert_eq!(config.logging.max_files, 3);
}

#[test]
fn test_partial_config_uses_defaults() {
    let toml_str = r#"
        config_version = 1

        [tray]
        tooltip = "Build agent"
    "#;

    let config: AppConfig = toml::from_str(toml_str).expect("Deserialization failed");
    assert_eq!(config.tray.tooltip.as_deref(), Some("Build agent"));
    assert_eq!(config.tray.icon_path, "resources/tray.ico");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_missing_file_loads_defaults() {
    let path = scratch_config("missing");
    let manager = ConfigManager::with_path(&path);

    let config = manager.load().unwrap();
    assert_eq!(config.config_version, CONFIG_VERSION);
    assert!(!path.exists(), "loading defaults must not create the file");
}

#[test]
fn test_save_and_load_roundtrip() {
    let path = scratch_config("roundtrip");
    let manager = ConfigManager::with_path(&path);

    let mut config = AppConfig::default();
    config.tray.icon_path = "icons/busy.ico".to_string();
    config.general.language = Some("de".to_string());
    manager.save(&config).unwrap();

    let loaded = manager.load().unwrap();
    assert_eq!(loaded.tray.icon_path, "icons/busy.ico");
    assert_eq!(loaded.general.language.as_deref(), Some("de"));

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn test_old_version_is_migrated_and_saved() {
    let path = scratch_config("migrate");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "config_version = 0\n").unwrap();
    let manager = ConfigManager::with_path(&path);

    let config = manager.load().unwrap();
    assert_eq!(config.config_version, CONFIG_VERSION);

    let saved: AppConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved.config_version, CONFIG_VERSION);

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn test_invalid_toml_is_config_error() {
    let path = scratch_config("invalid");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "config_version = [").unwrap();
    let manager = ConfigManager::with_path(&path);

    assert!(manager.load().is_err());

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}
