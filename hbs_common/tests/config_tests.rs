//! Config file tests.
//!
//! Loads the shipped `config/hbs.toml` and checks that every section
//! round-trips through TOML with its defaults intact.

use hbs_common::config::{ConfigLoader, HbsConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/hbs.toml");
    let config = HbsConfig::load(&path).expect("config/hbs.toml must parse");
    config.validate().expect("config/hbs.toml must validate");
    assert_eq!(config.motion.x_timeout_s, 2.0);
    assert_eq!(config.conveyor.output_run_s, 6.0);
}

#[test]
fn empty_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hbs.toml");
    fs::write(&path, "").unwrap();

    let config = HbsConfig::load(&path).unwrap();
    assert_eq!(config.shared.service_name, "hbs");
    assert_eq!(config.motion.tick_us, 1000);
    assert!(config.validate().is_ok());
}

#[test]
fn serialized_defaults_reload_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hbs.toml");
    let text = toml::to_string(&HbsConfig::default()).unwrap();
    fs::write(&path, text).unwrap();

    let config = HbsConfig::load(&path).unwrap();
    assert_eq!(config.simulation.start, [10.0, 1.0, 1.0]);
    assert_eq!(config.conveyor.input_debounce_s, 0.3);
}

#[test]
fn invalid_simulation_window_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hbs.toml");
    fs::write(&path, "[simulation]\nsensor_window = 0.7\n").unwrap();

    let config = HbsConfig::load(&path).unwrap();
    assert!(config.validate().is_err());
}
