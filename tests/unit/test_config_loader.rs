//! Unit Tests for Session File Loading

use installer_harness::config::loader::ConfigLoader;
use installer_harness::error::Error;
use installer_harness::{AnswerTable, ContainerConfig, Inventory, SessionConfig};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_load_toml_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.toml");
    fs::write(
        &path,
        r#"
installer = "scripts/install.sh"
args = "-L en"
timeout_secs = 600

[env]
SKIP_CHECKS = "1"

[answers]
"Admin login" = "admin"
"Use SSL" = "no"

[inventory]
license_ip = "10.0.0.1"

[container]
image = "centos:7"
name = "installer_test"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_path(&path).unwrap();
    assert_eq!(config.installer, dir.path().join("scripts/install.sh"));
    assert_eq!(config.argv().unwrap(), vec!["-L", "en"]);
    assert_eq!(config.timeout(), Some(Duration::from_secs(600)));
    assert_eq!(config.env.get("SKIP_CHECKS").map(String::as_str), Some("1"));
    assert_eq!(config.answers.lookup("Use SSL"), Some("no"));
    assert_eq!(config.inventory.get("license_ip"), Some("10.0.0.1"));
    assert_eq!(config.inventory_file, "hosts.txt");
    assert_eq!(config.fallback_answer, "value");

    let container = config.container.unwrap();
    assert_eq!(container.runtime, "docker");
    assert_eq!(container.mount_point, "/data");
}

#[test]
fn test_save_and_load_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let config = SessionConfig::new("/opt/installer/install.sh")
        .with_args("-v")
        .with_env("LANG", "C")
        .with_answers(AnswerTable::new().with("Name", "bob"))
        .with_inventory([("k", "v")].into_iter().collect::<Inventory>())
        .with_container(ContainerConfig::new("debian:12", "harness_json"));

    ConfigLoader::save_to_path(&config, &path).unwrap();
    assert_eq!(ConfigLoader::load_from_path(&path).unwrap(), config);
}

#[test]
fn test_save_and_load_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.toml");

    let config = SessionConfig::new("/opt/installer/install.sh")
        .with_answers(AnswerTable::new().with("Continue", "yes"))
        .with_timeout(Duration::from_secs(30));

    ConfigLoader::save_to_path(&config, &path).unwrap();
    assert_eq!(ConfigLoader::load_from_path(&path).unwrap(), config);
}

#[test]
fn test_parse_error_names_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.toml");
    fs::write(&path, "installer = [").unwrap();

    let result = ConfigLoader::load_from_path(&path);
    assert!(matches!(
        result,
        Err(Error::ConfigParseFailed { format, .. }) if format == "TOML"
    ));
}

#[test]
fn test_json_parse_error_names_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, "{\"installer\": ").unwrap();

    let err = ConfigLoader::load_from_path(&path).unwrap_err();
    assert!(matches!(
        &err,
        Error::ConfigParseFailed { format, .. } if format == "JSON"
    ));
    assert!(err.to_string().starts_with("Failed to parse JSON session file"));
}

#[test]
fn test_missing_installer_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, r#"{"args": "-v"}"#).unwrap();

    let result = ConfigLoader::load_from_path(&path);
    assert!(matches!(result, Err(Error::ConfigParseFailed { .. })));
}

#[test]
fn test_validation_runs_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.toml");
    fs::write(
        &path,
        "installer = \"/opt/install.sh\"\n[container]\nimage = \"\"\nname = \"n\"\n",
    )
    .unwrap();

    let result = ConfigLoader::load_from_path(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_search_paths_prefer_toml() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("installer-harness");
    fs::write(base.with_extension("json"), r#"{"installer": "/opt/b.sh"}"#).unwrap();
    fs::write(base.with_extension("toml"), "installer = \"/opt/a.sh\"\n").unwrap();

    let loader = ConfigLoader::with_search_paths(vec![dir.path().join("missing"), base]);
    let (path, config) = loader.find_and_load_config().unwrap().unwrap();
    assert_eq!(path.extension().unwrap(), "toml");
    assert_eq!(config.installer, PathBuf::from("/opt/a.sh"));
}

#[test]
fn test_search_skips_broken_files() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken");
    let good = dir.path().join("good");
    fs::write(broken.with_extension("toml"), "not toml [").unwrap();
    fs::write(good.with_extension("toml"), "installer = \"/opt/a.sh\"\n").unwrap();

    let loader = ConfigLoader::with_search_paths(vec![broken, good]);
    let (path, _) = loader.find_and_load_config().unwrap().unwrap();
    assert!(path.ends_with("good.toml"));
}
