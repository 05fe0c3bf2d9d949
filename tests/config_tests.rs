//! Integration tests for configuration loading and validation.

use gpgpu_emulator::common::SimError;
use gpgpu_emulator::config::Config;

/// Tests the built-in defaults.
#[test]
fn test_default_config() {
    let config = Config::default();

    assert!(!config.general.trace);
    assert_eq!(config.cache.cores, 4);
    assert_eq!(config.cache.sets(), 64);
    assert_eq!(config.cache.ways, 4);
    assert_eq!(config.cache.size_bytes(), 64 * 4 * 32);
    assert_eq!(config.memory.local_size_val(), 0x100000);
    assert!(config.validate().is_ok());
}

/// Tests that omitted sections and keys fall back to defaults.
#[test]
fn test_partial_config() {
    let config = Config::from_toml(
        r#"
        [cache]
        cores = 8
        ways = 1
        "#,
    )
    .unwrap();

    assert_eq!(config.cache.cores, 8);
    assert_eq!(config.cache.ways, 1);
    assert_eq!(config.cache.index_bits, 6);
    assert_eq!(config.cache.prefetch_queue, 8);
    assert_eq!(config.memory.host_size_val(), 0x100000);
}

/// Tests hex memory sizes.
#[test]
fn test_memory_sizes() {
    let config = Config::from_toml(
        r#"
        [general]
        trace = true

        [memory]
        local_size = "0x4000"
        host_size = "8000"
        "#,
    )
    .unwrap();

    assert!(config.general.trace);
    assert_eq!(config.memory.local_size_val(), 0x4000);
    assert_eq!(config.memory.host_size_val(), 0x8000);
}

/// Tests that the shipped configuration file loads.
#[test]
fn test_default_config_file() {
    let config = Config::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/configs/default.toml"))
        .unwrap();

    assert_eq!(config.cache.cores, 4);
    assert_eq!(config.cache.index_bits, 6);
}

/// Tests rejection of impossible geometries.
#[test]
fn test_invalid_geometry() {
    for doc in [
        "[cache]\ncores = 0",
        "[cache]\nways = 0",
        "[cache]\nindex_bits = 17",
        "[memory]\nlocal_size = \"0x30\"",
        "[memory]\nlocal_size = \"banana\"",
        "[memory]\nhost_size = \"\"",
    ] {
        match Config::from_toml(doc) {
            Err(SimError::InvalidConfig(_)) => {}
            other => panic!("{:?} accepted: {:?}", doc, other.map(|c| c.cache)),
        }
    }
}

/// Tests that a size string that is not hex is rejected, not defaulted.
#[test]
fn test_unparsable_size() {
    match Config::from_toml("[memory]\nlocal_size = \"banana\"") {
        Err(SimError::InvalidConfig(msg)) => {
            assert!(msg.contains("memory.local_size"), "{}", msg);
            assert!(msg.contains("banana"), "{}", msg);
        }
        other => panic!("accepted: {:?}", other.map(|c| c.memory)),
    }
}

/// Tests that malformed TOML is reported as a parse error.
#[test]
fn test_parse_error() {
    assert!(matches!(
        Config::from_toml("[cache]\ncores = \"four\""),
        Err(SimError::Parse { .. })
    ));
}

/// Tests that a missing file is reported with its path.
#[test]
fn test_missing_file() {
    let err = Config::from_file("/nonexistent/gpgpu.toml").unwrap_err();

    assert!(matches!(err, SimError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/gpgpu.toml"));
}
