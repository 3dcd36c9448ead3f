//! Configuration loading tests
//!
//! Tests touching process environment are marked #[serial].

use douanes_common::config::{ConfigOverrides, TomlConfig, ENV_BLACKOUT_FROM, ENV_BLACKOUT_TO, ENV_TITLE_COLOR};
use douanes_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(ENV_BLACKOUT_FROM);
    env::remove_var(ENV_BLACKOUT_TO);
    env::remove_var(ENV_TITLE_COLOR);
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let config = TomlConfig::load(Some(path.as_path()), ConfigOverrides::default()).unwrap();
    assert_eq!(config.database_path, PathBuf::from("douanes.db"));
    assert_eq!(config.blackout.from, "03:00");
}

#[test]
#[serial]
fn test_file_then_env_then_cli() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("douanes.toml");
    std::fs::write(
        &path,
        r##"
database_path = "/srv/douanes/file.db"
bind_addr = "127.0.0.1:6000"
report_title_color = "#111111"
villages = ["Montfort"]

[blackout]
from = "02:00"
to = "04:00"

[logging]
level = "debug"
"##,
    )
    .unwrap();

    env::set_var(ENV_BLACKOUT_TO, "06:00");
    env::set_var(ENV_TITLE_COLOR, "#222222");

    let config = TomlConfig::load(
        Some(path.as_path()),
        ConfigOverrides {
            database_path: Some(PathBuf::from("/tmp/cli.db")),
            bind_addr: None,
        },
    )
    .unwrap();
    clear_env();

    assert_eq!(config.database_path, PathBuf::from("/tmp/cli.db"));
    assert_eq!(config.bind_addr, "127.0.0.1:6000");
    assert_eq!(config.blackout.from, "02:00");
    assert_eq!(config.blackout.to, "06:00");
    assert_eq!(config.report_title_color, "#222222");
    assert_eq!(config.villages, vec!["Montfort"]);
    assert_eq!(config.logging.level, "debug");

    let options = config.submission_options().unwrap();
    assert_eq!(options.blackout.to_string(), "02:00-06:00");
}

#[test]
#[serial]
fn test_invalid_blackout_rejected() {
    clear_env();
    env::set_var(ENV_BLACKOUT_FROM, "3h");
    let result = TomlConfig::load(None, ConfigOverrides::default());
    clear_env();

    assert!(matches!(result, Err(Error::Config(_))));
}
