//! Tests for workload configuration: validation, presets, environment
//! loading and JSON persistence.

use super::*;
use crate::error::MaskError;
use crate::simd::BatchWidth;
use std::env;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = WorkloadConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.positions, 1024);
    assert_eq!(config.selectivity, 0.5);
    assert_eq!(config.seed, None);
    assert_eq!(config.alignment, 8);
    assert_eq!(config.batch_width, BatchWidth::Native);
    assert_eq!(WorkloadConfig::balanced_preset(), config);
}

#[test]
fn test_all_presets_valid() {
    assert!(WorkloadConfig::performance_preset().validate().is_ok());
    assert!(WorkloadConfig::memory_preset().validate().is_ok());
    assert!(WorkloadConfig::realtime_preset().validate().is_ok());
}

#[test]
fn test_builder() {
    let config = WorkloadConfig::builder()
        .positions(4096)
        .selectivity(0.1)
        .seed(7)
        .alignment(64)
        .batch_width(BatchWidth::Lanes(16))
        .build()
        .unwrap();

    assert_eq!(config.positions, 4096);
    assert_eq!(config.selectivity, 0.1);
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.alignment, 64);
    assert_eq!(config.batch_width, BatchWidth::Lanes(16));
}

#[test]
fn test_selectivity_bounds() {
    for selectivity in [0.0, 0.01, 1.0] {
        assert!(WorkloadConfig::builder().selectivity(selectivity).build().is_ok());
    }
    for selectivity in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
        let err = WorkloadConfig::builder().selectivity(selectivity).build().unwrap_err();
        assert!(matches!(err, MaskError::Configuration { .. }));
        assert!(err.to_string().contains("selectivity"));
    }
}

#[test]
fn test_alignment_validation() {
    assert!(WorkloadConfig::builder().alignment(1).build().is_ok());
    assert!(WorkloadConfig::builder().alignment(4096).build().is_ok());
    assert!(WorkloadConfig::builder().alignment(0).build().is_err());
    assert!(WorkloadConfig::builder().alignment(24).build().is_err());
    assert!(WorkloadConfig::builder().alignment(8192).build().is_err());
}

#[test]
fn test_zero_batch_width_rejected() {
    let err = WorkloadConfig::builder()
        .batch_width(BatchWidth::Lanes(0))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("batch_width"));
}

#[test]
fn test_all_field_errors_reported() {
    let config = WorkloadConfig {
        selectivity: 2.0,
        alignment: 3,
        ..WorkloadConfig::default()
    };
    let message = config.validate().unwrap_err().to_string();
    assert!(message.contains("selectivity"));
    assert!(message.contains("alignment"));
    assert!(!message.contains("positions"));
}

#[test]
fn test_zero_positions_allowed() {
    assert!(WorkloadConfig::builder().positions(0).build().is_ok());
}

#[test]
fn test_with_selectivity() {
    let base = WorkloadConfig::builder().positions(64).seed(1).build().unwrap();
    let swept = base.with_selectivity(0.01).unwrap();
    assert_eq!(swept.positions, 64);
    assert_eq!(swept.seed, Some(1));
    assert_eq!(swept.selectivity, 0.01);
    assert!(base.with_selectivity(-1.0).is_err());
}

#[test]
fn test_validation_error_display() {
    let error = ValidationError::new("alignment", 3, "must be a power of two").with_suggestion("1, 2, 4");
    let text = error.to_string();
    assert!(text.contains("'alignment'"));
    assert!(text.contains("'3'"));
    assert!(text.contains("expected 1, 2, 4"));
}

#[test]
fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workload.json");

    let config = WorkloadConfig::builder()
        .positions(2048)
        .selectivity(0.25)
        .seed(42)
        .batch_width(BatchWidth::Lanes(32))
        .build()
        .unwrap();
    config.save_to_file(&path).unwrap();
    assert!(path.exists());

    let loaded = WorkloadConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_rejects_invalid_content() {
    let dir = tempdir().unwrap();

    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "not json").unwrap();
    let err = WorkloadConfig::load_from_file(&garbage).unwrap_err();
    assert_eq!(err.category(), "config");

    let mut value = serde_json::to_value(WorkloadConfig::default()).unwrap();
    value["selectivity"] = serde_json::json!(3.5);
    let out_of_range = dir.path().join("out_of_range.json");
    fs::write(&out_of_range, value.to_string()).unwrap();
    assert!(WorkloadConfig::load_from_file(&out_of_range).is_err());

    assert!(WorkloadConfig::load_from_file(dir.path().join("missing.json")).is_err());
}

#[test]
fn test_from_env_with_prefix() {
    // Unique prefix so parallel tests never observe these variables
    let prefix = "SELMASK_TEST_ENV_";
    env::set_var(format!("{}POSITIONS", prefix), "512");
    env::set_var(format!("{}SELECTIVITY", prefix), " 0.125 ");
    env::set_var(format!("{}SEED", prefix), "99");
    env::set_var(format!("{}ALIGNMENT", prefix), "32");
    env::set_var(format!("{}BATCH_WIDTH", prefix), "NATIVE");

    let config = WorkloadConfig::from_env_with_prefix(prefix).unwrap();
    assert_eq!(config.positions, 512);
    assert_eq!(config.selectivity, 0.125);
    assert_eq!(config.seed, Some(99));
    assert_eq!(config.alignment, 32);
    assert_eq!(config.batch_width, BatchWidth::Native);

    env::set_var(format!("{}BATCH_WIDTH", prefix), "16");
    let config = WorkloadConfig::from_env_with_prefix(prefix).unwrap();
    assert_eq!(config.batch_width, BatchWidth::Lanes(16));

    for name in ["POSITIONS", "SELECTIVITY", "SEED", "ALIGNMENT", "BATCH_WIDTH"] {
        env::remove_var(format!("{}{}", prefix, name));
    }
}

#[test]
fn test_from_env_unparsable_keeps_default() {
    let prefix = "SELMASK_TEST_BAD_";
    env::set_var(format!("{}POSITIONS", prefix), "lots");
    env::set_var(format!("{}SEED", prefix), "-3");

    let config = WorkloadConfig::from_env_with_prefix(prefix).unwrap();
    assert_eq!(config.positions, 1024);
    assert_eq!(config.seed, None);

    env::remove_var(format!("{}POSITIONS", prefix));
    env::remove_var(format!("{}SEED", prefix));
}

#[test]
fn test_from_env_rejects_invalid_values() {
    let prefix = "SELMASK_TEST_INVALID_";
    env::set_var(format!("{}SELECTIVITY", prefix), "1.5");
    assert!(WorkloadConfig::from_env_with_prefix(prefix).is_err());
    env::remove_var(format!("{}SELECTIVITY", prefix));
}
