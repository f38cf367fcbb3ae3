//! Boundary: the action-ranking policy.

use std::mem;

use shield_types::{ActionId, ActionSpace};
use thiserror::Error;

/// Ranks every legal action from most to least preferred.
///
/// The ranking must be a permutation of the whole action space and
/// deterministic in the observation. Closures `Fn(&O) -> Vec<ActionId>`
/// implement this trait.
pub trait ActionOracle<O: ?Sized> {
    fn rank(&self, observation: &O) -> Vec<ActionId>;
}

impl<O, F> ActionOracle<O> for F
where
    O: ?Sized,
    F: Fn(&O) -> Vec<ActionId>,
{
    fn rank(&self, observation: &O) -> Vec<ActionId> {
        self(observation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankingError {
    #[error("ranking has {actual} actions, action space has {expected}")]
    WrongLength { expected: usize, actual: usize },
    #[error("action {action} is outside an action space of size {size}")]
    OutOfRange { action: ActionId, size: u32 },
    #[error("action {action} is ranked more than once")]
    Duplicate { action: ActionId },
}

/// A ranking proven to be a permutation of the action space.
///
/// Invariant: `len() == space.len()`, so any candidate index below the
/// action-space size is a valid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedActions(Vec<ActionId>);

impl RankedActions {
    pub fn new(actions: Vec<ActionId>, space: ActionSpace) -> Result<Self, RankingError> {
        if actions.len() != space.len() {
            return Err(RankingError::WrongLength {
                expected: space.len(),
                actual: actions.len(),
            });
        }
        let mut seen = vec![false; space.len()];
        for &action in &actions {
            if !space.contains(action) {
                return Err(RankingError::OutOfRange {
                    action,
                    size: space.size(),
                });
            }
            if mem::replace(&mut seen[action.index()], true) {
                return Err(RankingError::Duplicate { action });
            }
        }
        Ok(Self(actions))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ActionId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: action spaces are non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
