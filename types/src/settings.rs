//! Resolved run and sweep settings shared across crates.
//!
//! These types represent fully-validated configuration state. Raw TOML
//! deserialization structs stay private in `shield-config`, which resolves
//! them into these types at the parse boundary.

use std::ops::Range;

use serde::Serialize;

use crate::{ActionSpace, ShieldDepth};

/// Parameters of a single verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    action_space: ActionSpace,
    noop_count: u32,
    shield_depth: ShieldDepth,
    max_frames: u64,
    render: bool,
    action_repeat: u32,
}

impl RunConfig {
    /// No noop window, shielding disabled, no rendering, no action hold.
    ///
    /// The frame limit is checked after each accepted step, so even a limit
    /// of 0 lets the run take its first step.
    #[must_use]
    pub fn new(action_space: ActionSpace, max_frames: u64) -> Self {
        Self {
            action_space,
            noop_count: 0,
            shield_depth: ShieldDepth::DISABLED,
            max_frames,
            render: false,
            action_repeat: 0,
        }
    }

    pub fn with_noop_count(mut self, noop_count: u32) -> Self {
        self.noop_count = noop_count;
        self
    }

    pub fn with_shield_depth(mut self, shield_depth: ShieldDepth) -> Self {
        self.shield_depth = shield_depth;
        self
    }

    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Reuse each oracle-chosen action for `repeat` further shield-phase steps.
    pub fn with_action_repeat(mut self, repeat: u32) -> Self {
        self.action_repeat = repeat;
        self
    }

    #[must_use]
    pub const fn action_space(&self) -> ActionSpace {
        self.action_space
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
    pub const fn max_frames(&self) -> u64 {
        self.max_frames
    }

    #[must_use]
    pub const fn render(&self) -> bool {
        self.render
    }

    #[must_use]
    pub const fn action_repeat(&self) -> u32 {
        self.action_repeat
    }
}

/// A sweep of verification runs over a half-open range of noop counts.
///
/// An empty range is a valid plan; sweeping it yields no reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepPlan {
    noops: Range<u32>,
    demand_full_safety: bool,
    template: RunConfig,
}

impl SweepPlan {
    #[must_use]
    pub fn new(action_space: ActionSpace, noops: Range<u32>, max_frames: u64) -> Self {
        Self {
            noops,
            demand_full_safety: false,
            template: RunConfig::new(action_space, max_frames),
        }
    }

    /// Stop the sweep at the first run whose main phase is not fully safe.
    pub fn with_demand_full_safety(mut self, demand: bool) -> Self {
        self.demand_full_safety = demand;
        self
    }

    pub fn with_shield_depth(mut self, shield_depth: ShieldDepth) -> Self {
        self.template = self.template.with_shield_depth(shield_depth);
        self
    }

    pub fn with_render(mut self, render: bool) -> Self {
        self.template = self.template.with_render(render);
        self
    }

    pub fn with_action_repeat(mut self, repeat: u32) -> Self {
        self.template = self.template.with_action_repeat(repeat);
        self
    }

    #[must_use]
    pub fn noops(&self) -> Range<u32> {
        self.noops.clone()
    }

    #[must_use]
    pub const fn demand_full_safety(&self) -> bool {
        self.demand_full_safety
    }

    #[must_use]
    pub const fn action_space(&self) -> ActionSpace {
        self.template.action_space()
    }

    #[must_use]
    pub const fn shield_depth(&self) -> ShieldDepth {
        self.template.shield_depth()
    }

    #[must_use]
    pub const fn max_frames(&self) -> u64 {
        self.template.max_frames()
    }

    /// Configuration for the run at `noop_count`; every other parameter is
    /// fixed across the sweep.
    #[must_use]
    pub fn run_config(&self, noop_count: u32) -> RunConfig {
        self.template.with_noop_count(noop_count)
    }
}
