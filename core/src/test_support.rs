//! Scripted environment and oracles shared by unit tests.

use shield_types::{ActionId, ActionSpace, RunConfig, ShieldDepth};

use crate::environment::{Environment, EnvironmentError, Transition};
use crate::oracle::ActionOracle;

/// Decides safety from the full action path, current step included.
pub(crate) type Hazard = fn(&[ActionId]) -> bool;

/// Deterministic environment whose state is the path of actions taken.
///
/// The observation is the number of steps taken, the reward equals the
/// action id, and the step count after a step equals the run's frame.
#[derive(Debug)]
pub(crate) struct ScriptedEnv {
    path: Vec<ActionId>,
    hazard: Hazard,
    horizon: Option<usize>,
    fail_restore: bool,
    steps: usize,
    renders: usize,
}

impl ScriptedEnv {
    pub(crate) fn new(hazard: Hazard) -> Self {
        Self {
            path: Vec::new(),
            hazard,
            horizon: None,
            fail_restore: false,
            steps: 0,
            renders: 0,
        }
    }

    /// Report `done` once the path reaches `len` steps.
    pub(crate) fn with_horizon(mut self, len: usize) -> Self {
        self.horizon = Some(len);
        self
    }

    pub(crate) fn failing_restore(mut self) -> Self {
        self.fail_restore = true;
        self
    }

    pub(crate) fn path(&self) -> &[ActionId] {
        &self.path
    }

    pub(crate) fn steps(&self) -> usize {
        self.steps
    }

    pub(crate) fn renders(&self) -> usize {
        self.renders
    }
}

impl Environment for ScriptedEnv {
    type Observation = u64;
    type Checkpoint = Vec<ActionId>;

    fn reset(&mut self) -> Result<u64, EnvironmentError> {
        self.path.clear();
        Ok(0)
    }

    fn step(&mut self, action: ActionId) -> Result<Transition<u64>, EnvironmentError> {
        if self.horizon.is_some_and(|len| self.path.len() >= len) {
            return Err(EnvironmentError::new("stepped past done"));
        }
        self.steps += 1;
        self.path.push(action);
        Ok(Transition {
            observation: self.path.len() as u64,
            reward: f64::from(action.value()),
            done: self.horizon.is_some_and(|len| self.path.len() >= len),
            safe: !(self.hazard)(&self.path),
        })
    }

    fn save(&self) -> Result<Vec<ActionId>, EnvironmentError> {
        Ok(self.path.clone())
    }

    fn restore(&mut self, checkpoint: &Vec<ActionId>) -> Result<(), EnvironmentError> {
        if self.fail_restore {
            return Err(EnvironmentError::new("checkpoint could not be restored"));
        }
        self.path.clone_from(checkpoint);
        Ok(())
    }

    fn render(&mut self) -> Result<(), EnvironmentError> {
        self.renders += 1;
        Ok(())
    }
}

/// Ranks actions from the highest id down, ignoring the observation.
pub(crate) struct PreferHigh(u32);

impl ActionOracle<u64> for PreferHigh {
    fn rank(&self, _observation: &u64) -> Vec<ActionId> {
        (0..self.0).rev().map(ActionId::new).collect()
    }
}

pub(crate) fn prefer_high(size: u32) -> PreferHigh {
    PreferHigh(size)
}

pub(crate) fn actions(raw: &[u32]) -> Vec<ActionId> {
    raw.iter().copied().map(ActionId::new).collect()
}

pub(crate) fn run_config(size: u32, noops: u32, shield: u32, max_frames: u64) -> RunConfig {
    let space = ActionSpace::new(size).expect("test fixture must use a non-empty action space");
    RunConfig::new(space, max_frames)
        .with_noop_count(noops)
        .with_shield_depth(ShieldDepth::new(shield))
}
