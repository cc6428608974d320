//! Edge case and error scenario tests

use octlib_config::{Config, ConfigError, ConfigManager};
use std::fs;
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_corrupted_config_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    fs::write(manager.config_path(), "this is not valid TOML {{{")?;

    assert!(matches!(manager.load(), Err(ConfigError::ParseError { .. })));
    let config = manager.load_or_default();
    assert_eq!(config, Config::default());

    Ok(())
}

#[test]
fn test_save_creates_parent_directories() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let nested_path = temp_dir.path().join("a").join("b").join("c");
    let manager = ConfigManager::with_directory(nested_path)?;

    manager.save(&Config::default())?;

    assert!(manager.config_path().exists());

    Ok(())
}

#[test]
fn test_empty_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    fs::write(manager.config_path(), "")?;

    assert!(manager.load().is_err());
    assert_eq!(manager.load_or_default(), Config::default());

    Ok(())
}

#[test]
fn test_config_file_deleted_during_operation() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.initialize()?;

    fs::remove_file(manager.config_path())?;

    let config = manager.load_or_default();
    assert_eq!(config, Config::default());

    Ok(())
}

#[test]
fn test_partial_config_toml() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let partial_toml = r#"
version = 1

[store]
data_file = "/srv/octlib/store.json"
"#;
    fs::write(manager.config_path(), partial_toml)?;

    let config = manager.load()?;
    assert_eq!(
        config.store.data_file,
        std::path::PathBuf::from("/srv/octlib/store.json")
    );
    assert_eq!(config.store.watch_interval_ms, 1000);
    assert_eq!(config.app, Config::default().app);

    Ok(())
}

#[test]
fn test_invalid_values_loaded_with_warning() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    fs::write(
        manager.config_path(),
        "[store]\nwatch_interval_ms = 5\n",
    )?;

    // Loading keeps the value so the user can fix it; saving refuses it
    let config = manager.load()?;
    assert_eq!(config.store.watch_interval_ms, 5);
    assert_eq!(manager.validate()?.len(), 1);
    assert!(manager.save(&config).is_err());

    Ok(())
}

#[test]
fn test_unknown_log_level_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    fs::write(manager.config_path(), "[app]\nlog_level = \"loud\"\n")?;

    assert!(matches!(manager.load(), Err(ConfigError::ParseError { .. })));

    Ok(())
}

#[test]
fn test_backup_preserved_on_failed_save() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let mut config = Config::default();
    config.store.watch_interval_ms = 500;
    manager.save(&config)?;
    manager.save(&config)?;

    config.store.watch_interval_ms = 1;
    assert!(manager.save(&config).is_err());

    let backup_path = manager.config_path().with_extension("toml.backup");
    let backup_contents = fs::read_to_string(&backup_path)?;
    let backup_config: Config = toml::from_str(&backup_contents)?;
    assert_eq!(backup_config.store.watch_interval_ms, 500);

    Ok(())
}

#[test]
fn test_concurrent_config_loads() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().to_path_buf();
    let manager = ConfigManager::with_directory(config_dir.clone())?;
    manager.initialize()?;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let dir = config_dir.clone();
            std::thread::spawn(move || {
                if let Ok(mgr) = ConfigManager::with_directory(dir) {
                    for _ in 0..10 {
                        let _ = mgr.load();
                        std::thread::sleep(std::time::Duration::from_millis(1));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok());
    }

    Ok(())
}
