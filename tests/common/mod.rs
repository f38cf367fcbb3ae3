//! Shared test utilities and fixtures
//!
//! A deterministic path-recording environment and simple oracles for driving
//! the verifier through its public API.

#![allow(dead_code)]

use shield_core::{Environment, EnvironmentError, Transition};
use shield_types::{ActionId, ActionSpace, RunConfig, ShieldDepth};

/// Labels the newest step given the whole action path, newest action last.
/// The path length equals the frame of that step.
pub type Hazard = fn(&[ActionId]) -> bool;

/// Environment whose state is the list of actions taken so far.
///
/// Reward equals the action id, so totals tell which actions were committed.
#[derive(Debug, Clone)]
pub struct PathEnv {
    path: Vec<ActionId>,
    hazard: Hazard,
}

impl PathEnv {
    pub fn new(hazard: Hazard) -> Self {
        Self {
            path: Vec::new(),
            hazard,
        }
    }

    pub fn path(&self) -> &[ActionId] {
        &self.path
    }
}

impl Environment for PathEnv {
    type Observation = usize;
    type Checkpoint = Vec<ActionId>;

    fn reset(&mut self) -> Result<usize, EnvironmentError> {
        self.path.clear();
        Ok(0)
    }

    fn step(&mut self, action: ActionId) -> Result<Transition<usize>, EnvironmentError> {
        self.path.push(action);
        Ok(Transition {
            observation: self.path.len(),
            reward: f64::from(action.value()),
            done: false,
            safe: !(self.hazard)(&self.path),
        })
    }

    fn save(&self) -> Result<Vec<ActionId>, EnvironmentError> {
        Ok(self.path.clone())
    }

    fn restore(&mut self, checkpoint: &Vec<ActionId>) -> Result<(), EnvironmentError> {
        self.path.clone_from(checkpoint);
        Ok(())
    }
}

/// Ranks every action from the highest id down.
pub fn prefer_high(size: u32) -> impl Fn(&usize) -> Vec<ActionId> {
    move |_| (0..size).rev().map(ActionId::new).collect()
}

pub fn never(_: &[ActionId]) -> bool {
    false
}

pub fn space(size: u32) -> ActionSpace {
    ActionSpace::new(size).expect("fixture action space must be non-empty")
}

pub fn config(size: u32, noops: u32, shield: u32, max_frames: u64) -> RunConfig {
    RunConfig::new(space(size), max_frames)
        .with_noop_count(noops)
        .with_shield_depth(ShieldDepth::new(shield))
}

pub fn actions(raw: &[u32]) -> Vec<ActionId> {
    raw.iter().copied().map(ActionId::new).collect()
}
