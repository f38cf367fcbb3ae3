//! Built-in lane-runner process used by the `shield` binary.
//!
//! A vehicle drives down a road of `lanes` lanes, one row per frame.
//! Each row's obstacles come from a `StdRng` seeded with the demo seed and
//! the row index, so every instance built from the same settings is
//! identical and rows can be regenerated after a restore. One lane per row is
//! always clear, although reaching it may take more lane changes than are
//! left.

use std::num::NonZeroU32;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use shield_config::DemoSettings;
use shield_core::{ActionOracle, Environment, EnvironmentError, Transition};
use shield_types::{ActionId, ActionSpace};

pub const STAY: ActionId = ActionId::NOOP;
pub const LEFT: ActionId = ActionId::new(1);
pub const RIGHT: ActionId = ActionId::new(2);

const ACTIONS: ActionSpace = ActionSpace::from_non_zero(NonZeroU32::new(3).unwrap());

/// What the oracle sees after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerView {
    pub row: u64,
    pub lane: u32,
    pub lanes: u32,
}

impl RunnerView {
    /// The rightmost lane, worth a bonus point per frame.
    #[must_use]
    pub const fn fast_lane(&self) -> u32 {
        self.lanes - 1
    }
}

/// Position on the road. Also the checkpoint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerState {
    row: u64,
    lane: u32,
}

#[derive(Debug, Clone)]
pub struct LaneRunner {
    settings: DemoSettings,
    state: RunnerState,
}

impl LaneRunner {
    #[must_use]
    pub fn new(settings: DemoSettings) -> Self {
        Self {
            settings,
            state: RunnerState { row: 0, lane: 0 },
        }
    }

    /// Stay, left and right.
    #[must_use]
    pub const fn action_space() -> ActionSpace {
        ACTIONS
    }

    #[must_use]
    pub fn view(&self) -> RunnerView {
        RunnerView {
            row: self.state.row,
            lane: self.state.lane,
            lanes: self.settings.lanes(),
        }
    }

    fn finished(&self) -> bool {
        self.state.row >= self.settings.road_length()
    }

    /// Obstacle flags for every lane of `row`. The start row is clear.
    #[must_use]
    pub fn obstacles(&self, row: u64) -> Vec<bool> {
        let lanes = self.settings.lanes();
        if row == 0 {
            return vec![false; lanes as usize];
        }
        let mut rng = StdRng::seed_from_u64(self.settings.seed() ^ row.rotate_left(32));
        let clear = rng.random_range(0..lanes);
        let density = self.settings.obstacle_density();
        (0..lanes)
            .map(|lane| lane != clear && rng.random_bool(density))
            .collect()
    }

    #[must_use]
    pub fn is_blocked(&self, row: u64, lane: u32) -> bool {
        self.obstacles(row)
            .get(lane as usize)
            .copied()
            .unwrap_or(false)
    }
}

impl Environment for LaneRunner {
    type Observation = RunnerView;
    type Checkpoint = RunnerState;

    fn reset(&mut self) -> Result<RunnerView, EnvironmentError> {
        self.state = RunnerState { row: 0, lane: 0 };
        Ok(self.view())
    }

    fn step(&mut self, action: ActionId) -> Result<Transition<RunnerView>, EnvironmentError> {
        if self.finished() {
            return Err(EnvironmentError::new("stepped past the end of the road"));
        }
        let last_lane = self.settings.lanes() - 1;
        let lane = self.state.lane;
        self.state.lane = match action {
            STAY => lane,
            LEFT => lane.saturating_sub(1),
            RIGHT => (lane + 1).min(last_lane),
            other => {
                return Err(EnvironmentError::new(format!("unknown action {other}")));
            }
        };
        self.state.row += 1;

        let view = self.view();
        let bonus = if view.lane == view.fast_lane() { 1.0 } else { 0.0 };
        Ok(Transition {
            observation: view,
            reward: 1.0 + bonus,
            done: self.finished(),
            safe: !self.is_blocked(view.row, view.lane),
        })
    }

    fn save(&self) -> Result<RunnerState, EnvironmentError> {
        Ok(self.state)
    }

    fn restore(&mut self, checkpoint: &RunnerState) -> Result<(), EnvironmentError> {
        self.state = *checkpoint;
        Ok(())
    }

    fn render(&mut self) -> Result<(), EnvironmentError> {
        let RunnerState { row, lane: own } = self.state;
        let road: String = self
            .obstacles(row)
            .into_iter()
            .zip(0..)
            .map(|(blocked, lane)| match (lane == own, blocked) {
                (true, true) => 'X',
                (true, false) => 'A',
                (false, true) => '#',
                (false, false) => '.',
            })
            .collect();
        let next: String = self
            .obstacles(row + 1)
            .into_iter()
            .map(|blocked| if blocked { '#' } else { '.' })
            .collect();
        tracing::debug!(row, %road, %next, "lane runner");
        Ok(())
    }
}

/// Myopic oracle: always heads for the fast lane and never looks at obstacles.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastLaneOracle;

impl ActionOracle<RunnerView> for FastLaneOracle {
    fn rank(&self, view: &RunnerView) -> Vec<ActionId> {
        if view.lane < view.fast_lane() {
            vec![RIGHT, STAY, LEFT]
        } else {
            vec![STAY, LEFT, RIGHT]
        }
    }
}
