//! End-to-end verification runs through the public `shield_core` API.

use shield_core::{ShieldError, VerificationRun};
use shield_types::{ActionId, Frame};

use crate::common::{PathEnv, actions, config, never, prefer_high};

fn hazard_at_three(path: &[ActionId]) -> bool {
    path.len() == 3
}

fn high_action_at_three(path: &[ActionId]) -> bool {
    path.len() == 3 && path[2] == ActionId::new(1)
}

fn hazard_at_two(path: &[ActionId]) -> bool {
    path.len() == 2
}

#[test]
fn unshielded_run_reports_first_hazard() {
    let oracle = prefer_high(2);
    let report = VerificationRun::new(&oracle, PathEnv::new(hazard_at_three), config(2, 0, 0, 10))
        .and_then(VerificationRun::run_to_completion)
        .unwrap();
    assert_eq!(report.main_violation_frame(), Some(Frame::new(3)));
    assert_eq!(report.noop_violation_frame(), None);
    assert_eq!(report.frames_survived(), 10);
    assert_eq!(report.stats().backtracks, 0);
}

#[test]
fn shield_substitutes_safe_alternative() {
    let oracle = prefer_high(2);
    let mut run =
        VerificationRun::new(&oracle, PathEnv::new(high_action_at_three), config(2, 0, 2, 10))
            .unwrap();
    let report = loop {
        if let Some(report) = run.step().unwrap() {
            break report;
        }
    };
    assert_eq!(report.main_violation_frame(), None);
    assert!(report.is_main_safe());
    // Nine frames with action 1, action 0 substituted at frame 3.
    assert!((report.total_reward() - 9.0).abs() < f64::EPSILON);
    assert_eq!(report.stats().backtracks, 1);
    assert_eq!(run.environment().path()[..4], actions(&[1, 1, 0, 1])[..]);
}

#[test]
fn unavoidable_hazard_is_recorded_where_found() {
    let oracle = prefer_high(1);
    let report = VerificationRun::new(&oracle, PathEnv::new(hazard_at_two), config(1, 0, 5, 10))
        .and_then(VerificationRun::run_to_completion)
        .unwrap();
    assert_eq!(report.main_violation_frame(), Some(Frame::new(2)));
    assert_eq!(report.stats().exhausted_horizons, 1);
    assert_eq!(report.frames_survived(), 10);
}

#[test]
fn noop_window_violation_is_kept_apart() {
    let oracle = prefer_high(2);
    let report = VerificationRun::new(&oracle, PathEnv::new(hazard_at_two), config(2, 2, 3, 6))
        .and_then(VerificationRun::run_to_completion)
        .unwrap();
    assert_eq!(report.noop_violation_frame(), Some(Frame::new(2)));
    assert_eq!(report.main_violation_frame(), None);
    assert_eq!(report.noop_count(), 2);
}

#[test]
fn shield_depth_does_not_change_safe_runs() {
    let oracle = prefer_high(2);
    for depth in 0..6 {
        let report =
            VerificationRun::new(&oracle, PathEnv::new(never), config(2, 1, depth, 12))
                .and_then(VerificationRun::run_to_completion)
                .unwrap();
        assert!(report.is_main_safe(), "depth {depth}");
        // Frame 1 is the forced noop, the rest pick action 1.
        assert!((report.total_reward() - 11.0).abs() < f64::EPSILON);
    }
}

#[test]
fn wrong_length_ranking_aborts_before_first_step() {
    let oracle = |_: &usize| actions(&[1]);
    let err = VerificationRun::new(&oracle, PathEnv::new(never), config(2, 0, 2, 10))
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(
        err,
        ShieldError::OracleContract { frame, .. } if frame == Frame::FIRST
    ));
}
