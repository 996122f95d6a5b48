// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use facemask::Config;
use facemask::app::frame_processor::StabilityPolicy;
use std::path::PathBuf;
use std::time::Duration;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("facemask-config-{}", uuid::Uuid::new_v4()))
        .join(name)
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.scan.camera_width, 805);
    assert_eq!(config.scan.camera_height, 672);
    assert_eq!(config.scan.stability, StabilityPolicy::Frames(100));
    assert_eq!(config.analyze_duration(), Duration::from_secs(5));
    assert_eq!(config.projection.storage_key, "projSettings");
}

#[test]
fn test_guide_region_is_relative_to_camera() {
    let config = Config::default();
    let guide = config.scan.guide_region();

    // Guide at (815, 351) on the page, camera viewport at (558, 191)
    assert_eq!(guide.left, 257.0);
    assert_eq!(guide.top, 160.0);
    assert_eq!(guide.width, 289.0);
    assert_eq!(guide.height, 301.0);
}

#[test]
fn test_config_save_and_load() {
    let path = temp_path("config.json");
    let mut config = Config::default();
    config.analyze_duration_ms = 1500;
    config.scan.min_face_ratio = 0.3;

    config.save(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_partial_config_fills_defaults() {
    let path = temp_path("config.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"analyze_duration_ms": 2000}"#).unwrap();

    let loaded = Config::load(Some(&path));
    assert_eq!(loaded.analyze_duration(), Duration::from_secs(2));
    assert_eq!(loaded.scan, Config::default().scan);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let path = temp_path("config.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{"scan": {"min_face_ratio": 0.9, "max_face_ratio": 0.5}}"#,
    )
    .unwrap();

    assert!(Config::load_from(&path).is_err());
    assert_eq!(Config::load(Some(&path)), Config::default());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_missing_config_uses_defaults() {
    let path = temp_path("absent.json");
    assert_eq!(Config::load(Some(&path)), Config::default());
}
