//! Tests for loading and saving connection settings

use mhs_dds_core::protocol::{ConnectionConfig, ProtocolError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("connection.json");

    let config = ConnectionConfig {
        port_name: "/dev/ttyUSB1".to_string(),
        baud_rate: 57600,
        timeout_ms: 250,
    };
    config.save(&path).unwrap();

    let loaded = ConnectionConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_missing_fields_use_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("connection.json");
    fs::write(&path, r#"{ "port_name": "COM4" }"#).unwrap();

    let loaded = ConnectionConfig::load(&path).unwrap();
    assert_eq!(loaded.port_name, "COM4");
    assert_eq!(loaded.baud_rate, 57600);
    assert_eq!(loaded.timeout_ms, 100);
}

#[test]
fn test_config_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("connection.json");
    fs::write(&path, "port_name = COM4").unwrap();

    let result = ConnectionConfig::load(&path);
    assert!(matches!(result, Err(ProtocolError::Config(_))));
}

#[test]
fn test_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = ConnectionConfig::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ProtocolError::IoError(_))));
}
