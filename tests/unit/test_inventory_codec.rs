//! Unit Tests for the Inventory Codec
//!
//! These tests verify the flat `key=value` format read and written around
//! every installer run.

use installer_harness::error::Error;
use installer_harness::Inventory;
use std::collections::HashMap;
use std::fs;

#[test]
fn test_malformed_lines_are_skipped() {
    let text = "# generated by installer\n\nlicense_ip=10.0.0.1\nnot an entry\n\ndb_name=keitaro\n";
    let inventory = Inventory::deserialize(text);

    let expected: HashMap<String, String> = [
        ("license_ip".to_string(), "10.0.0.1".to_string()),
        ("db_name".to_string(), "keitaro".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(inventory.values(), &expected);
}

#[test]
fn test_comment_with_separator_is_an_entry() {
    // Only lines without '=' are ignored
    let inventory = Inventory::deserialize("# a=b\n");
    assert_eq!(inventory.get("# a"), Some("b"));
}

#[test]
fn test_crlf_lines_keep_carriage_return() {
    // Only '\n' separates lines
    let inventory = Inventory::deserialize("k=v\r\nb=2\r\n");
    assert_eq!(inventory.get("k"), Some("v\r"));
    assert_eq!(inventory.get("b"), Some("2\r"));
}

#[test]
fn test_trailing_carriage_return_survives_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts.txt");

    let seed: Inventory = [("db_password", "secret\r")].into_iter().collect();
    seed.write_to_file(&path).unwrap();

    assert_eq!(Inventory::read_from_file(&path).unwrap(), seed);
}

#[test]
fn test_empty_text() {
    assert!(Inventory::deserialize("").is_empty());
    assert!(Inventory::deserialize("\n\n").is_empty());
}

#[test]
fn test_serialized_lines() {
    let inventory: Inventory = [("a", "1"), ("b", ""), ("c", "x=y")].into_iter().collect();
    let text = inventory.serialize();

    assert!(text.ends_with('\n'));
    assert!(!text.ends_with("\n\n"));

    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["a=1", "b=", "c=x=y"]);
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts.txt");

    let inventory: Inventory = [("ssl", "yes"), ("admin_login", "admin")]
        .into_iter()
        .collect();
    inventory.write_to_file(&path).unwrap();

    assert_eq!(Inventory::read_from_file(&path).unwrap(), inventory);
}

#[test]
fn test_read_tolerates_hand_edited_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts.txt");
    fs::write(&path, "[keitaro]\nlocalhost connection=local\n\nkey=value").unwrap();

    let inventory = Inventory::read_from_file(&path).unwrap();
    assert_eq!(inventory.len(), 2);
    assert_eq!(inventory.get("localhost connection"), Some("local"));
    assert_eq!(inventory.get("key"), Some("value"));
}

#[test]
fn test_read_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Inventory::read_from_file(&dir.path().join("missing.txt"));
    assert!(matches!(result, Err(Error::InventoryReadFailed { .. })));
}

#[test]
fn test_write_into_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let result = Inventory::new().write_to_file(&dir.path().join("nope").join("hosts.txt"));
    assert!(matches!(result, Err(Error::InventoryWriteFailed { .. })));
}
