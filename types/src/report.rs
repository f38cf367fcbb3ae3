//! Verification outcomes.
//!
//! Proven violations and resource exhaustion are results, not errors: a run
//! that cannot avoid a hazard still produces a complete report.

use std::{fmt, slice};

use serde::{Deserialize, Serialize};

use crate::{Frame, ShieldDepth};

/// Which part of a run a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Frames `1..=noop_count`: the fixed no-op action is forced.
    Noop,
    /// Frames after the noop window: the oracle's ranking drives the search.
    Main,
}

impl Phase {
    #[must_use]
    pub const fn of(frame: Frame, noop_count: u32) -> Self {
        if frame.value() <= noop_count as u64 {
            Phase::Noop
        } else {
            Phase::Main
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Phase::Noop => "noop",
            Phase::Main => "main",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Permanently recorded violation frames, one slot per phase.
///
/// The first record for a phase wins; later records are ignored so the
/// reported frame is always the earliest proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Violations {
    noop: Option<Frame>,
    main: Option<Frame>,
}

impl Violations {
    /// Returns `true` if this call recorded a new violation.
    pub fn record(&mut self, phase: Phase, frame: Frame) -> bool {
        let slot = match phase {
            Phase::Noop => &mut self.noop,
            Phase::Main => &mut self.main,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(frame);
        true
    }

    #[must_use]
    pub const fn get(&self, phase: Phase) -> Option<Frame> {
        match phase {
            Phase::Noop => self.noop,
            Phase::Main => self.main,
        }
    }

    #[must_use]
    pub const fn is_recorded(&self, phase: Phase) -> bool {
        self.get(phase).is_some()
    }

    #[must_use]
    pub const fn noop(&self) -> Option<Frame> {
        self.noop
    }

    #[must_use]
    pub const fn main(&self) -> Option<Frame> {
        self.main
    }
}

/// Counters describing how much work the search did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Calls to the environment's `step`.
    pub steps: u64,
    /// Unsafe labels answered by trying another candidate.
    pub backtracks: u64,
    /// Checkpoint restores issued to the environment.
    pub restores: u64,
    /// Pending steps made irrevocable, including the final drain.
    pub commits: u64,
    /// Times every alternative at the commit horizon was exhausted.
    pub exhausted_horizons: u64,
    /// Largest number of pending steps held at once.
    pub max_speculation: usize,
}

/// Result of one verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    noop_count: u32,
    shield_depth: ShieldDepth,
    main_violation_frame: Option<Frame>,
    noop_violation_frame: Option<Frame>,
    total_reward: f64,
    frames_survived: u64,
    stats: SearchStats,
}

impl VerificationReport {
    #[must_use]
    pub fn new(
        noop_count: u32,
        shield_depth: ShieldDepth,
        violations: Violations,
        total_reward: f64,
        frames_survived: u64,
        stats: SearchStats,
    ) -> Self {
        Self {
            noop_count,
            shield_depth,
            main_violation_frame: violations.main(),
            noop_violation_frame: violations.noop(),
            total_reward,
            frames_survived,
            stats,
        }
    }

    #[must_use]
    pub const fn noop_count(&self) -> u32 {
        self.noop_count
    }

    #[must_use]
    pub const fn shield_depth(&self) -> ShieldDepth {
        self.shield_depth
    }

    #[must_use]
    pub const fn main_violation_frame(&self) -> Option<Frame> {
        self.main_violation_frame
    }

    #[must_use]
    pub const fn noop_violation_frame(&self) -> Option<Frame> {
        self.noop_violation_frame
    }

    #[must_use]
    pub const fn total_reward(&self) -> f64 {
        self.total_reward
    }

    #[must_use]
    pub const fn frames_survived(&self) -> u64 {
        self.frames_survived
    }

    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// No violation was proven after the noop window.
    #[must_use]
    pub const fn is_main_safe(&self) -> bool {
        self.main_violation_frame.is_none()
    }
}

/// Reports from a sweep, in increasing noop-count order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SweepResult {
    reports: Vec<VerificationReport>,
    stopped_early: bool,
}

impl SweepResult {
    #[must_use]
    pub fn new(reports: Vec<VerificationReport>, stopped_early: bool) -> Self {
        Self {
            reports,
            stopped_early,
        }
    }

    #[must_use]
    pub fn reports(&self) -> &[VerificationReport] {
        &self.reports
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// The sweep was cut short by a main-phase violation.
    #[must_use]
    pub const fn stopped_early(&self) -> bool {
        self.stopped_early
    }

    /// Every collected run kept its main phase safe.
    #[must_use]
    pub fn fully_safe(&self) -> bool {
        self.reports.iter().all(VerificationReport::is_main_safe)
    }

    #[must_use]
    pub fn first_unsafe(&self) -> Option<&VerificationReport> {
        self.reports.iter().find(|report| !report.is_main_safe())
    }
}

impl<'a> IntoIterator for &'a SweepResult {
    type Item = &'a VerificationReport;
    type IntoIter = slice::Iter<'a, VerificationReport>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.iter()
    }
}
