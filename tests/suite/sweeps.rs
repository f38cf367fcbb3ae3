//! Sweeps assembled from config files, the way the binary builds them.

use std::cell::Cell;
use std::fs;

use shield_config::ShieldConfig;
use shield_core::{EnvironmentError, sweep};
use shield_types::{ActionId, SweepResult};

use crate::common::{PathEnv, never, prefer_high, space};

fn doomed_at_four(path: &[ActionId]) -> bool {
    path.len() == 4
}

fn config_from(toml: &str) -> ShieldConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, toml).unwrap();
    ShieldConfig::load(Some(&path)).unwrap()
}

#[test]
fn full_safety_demand_stops_after_first_unsafe_run() {
    let config = config_from(
        r"
        [sweep]
        min_noops = 0
        max_noops = 3
        shield_depth = 2
        max_frames = 8
        demand_full_safety = true
        ",
    );
    let plan = config.sweep.plan(space(2));
    let created = Cell::new(0_u32);
    let factory = || {
        let noop_count = created.get();
        created.set(noop_count + 1);
        let hazard = if noop_count == 1 { doomed_at_four } else { never };
        Ok::<_, EnvironmentError>(PathEnv::new(hazard))
    };

    let result = sweep(factory, &prefer_high(2), &plan).unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.stopped_early());
    assert!(!result.fully_safe());
    assert_eq!(created.get(), 2);
    let noops: Vec<u32> = result.reports().iter().map(|r| r.noop_count()).collect();
    assert_eq!(noops, vec![0, 1]);
}

#[test]
fn sweep_without_demand_covers_whole_range() {
    let config = config_from(
        r"
        [sweep]
        min_noops = 1
        max_noops = 4
        shield_depth = 3
        max_frames = 8
        ",
    );
    let plan = config.sweep.plan(space(2));
    let result = sweep(|| Ok(PathEnv::new(doomed_at_four)), &prefer_high(2), &plan).unwrap();

    assert_eq!(result.len(), 3);
    assert!(!result.stopped_early());
    for report in &result {
        assert_eq!(report.shield_depth().value(), 3);
        assert_eq!(report.frames_survived(), 8);
    }
    assert_eq!(result.first_unsafe().map(|r| r.noop_count()), Some(1));
}

#[test]
fn empty_noop_range_yields_empty_result() {
    let config = config_from("[sweep]\nmin_noops = 3\nmax_noops = 3\n");
    let plan = config.sweep.plan(space(2));
    let created = Cell::new(0_u32);
    let factory = || {
        created.set(created.get() + 1);
        Ok::<_, EnvironmentError>(PathEnv::new(never))
    };

    let result = sweep(factory, &prefer_high(2), &plan).unwrap();
    assert!(result.is_empty());
    assert!(!result.stopped_early());
    assert!(result.fully_safe());
    assert_eq!(created.get(), 0);
}

#[test]
fn sweep_result_survives_json() {
    let config = config_from("[sweep]\nmax_noops = 2\nmax_frames = 5\n");
    let plan = config.sweep.plan(space(2));
    let result = sweep(|| Ok(PathEnv::new(never)), &prefer_high(2), &plan).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["stopped_early"], false);
    assert_eq!(json["reports"].as_array().map(Vec::len), Some(2));
    let back: SweepResult = serde_json::from_value(json).unwrap();
    assert_eq!(back, result);
}
