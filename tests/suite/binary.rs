//! Runs the `shield` binary against the lane-runner demo.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use shield_types::SweepResult;

fn run_shield(config: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shield"))
        .arg(config)
        .env("RUST_LOG", "warn")
        .output()
        .expect("shield binary should launch")
}

#[test]
fn prints_sweep_result_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r"
        [sweep]
        min_noops = 0
        max_noops = 3
        shield_depth = 4
        max_frames = 60

        [demo]
        lanes = 3
        road_length = 50
        obstacle_density = 0.3
        seed = 3
        ",
    )
    .unwrap();

    let output = run_shield(&path);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let result: SweepResult = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result.len(), 3);
    assert!(!result.stopped_early());
    for (noop_count, report) in (0..3).zip(&result) {
        assert_eq!(report.noop_count(), noop_count);
        assert_eq!(report.frames_survived(), 50);
    }

    let again: SweepResult = serde_json::from_slice(&run_shield(&path).stdout).unwrap();
    assert_eq!(again, result);
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_shield(&dir.path().join("absent.toml"));
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load config"));
}

#[test]
fn empty_noop_range_prints_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[sweep]\nmin_noops = 5\nmax_noops = 2\n").unwrap();
    let output = run_shield(&path);
    assert!(output.status.success());
    let result: SweepResult = serde_json::from_slice(&output.stdout).unwrap();
    assert!(result.is_empty());
    assert!(!result.stopped_early());
}

#[test]
fn invalid_demo_settings_fail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[demo]\nobstacle_density = 2.0\n").unwrap();
    let output = run_shield(&path);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
