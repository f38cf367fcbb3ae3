//! Search limit invariant types.
//!
//! These types guarantee a usable action space and shield window by
//! construction: a zero-sized action space is unrepresentable.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ActionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LimitsError {
    #[error("action space must contain at least one action")]
    EmptyActionSpace,
}

/// Size `N` of the environment's discrete action space.
///
/// Every ranked action list must have exactly this length, and every action
/// id must be below it. Action 0 is always a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ActionSpace(NonZeroU32);

impl ActionSpace {
    pub fn new(size: u32) -> Result<Self, LimitsError> {
        NonZeroU32::new(size)
            .map(Self)
            .ok_or(LimitsError::EmptyActionSpace)
    }

    /// Infallible constructor for sizes known at compile time.
    #[must_use]
    pub const fn from_non_zero(size: NonZeroU32) -> Self {
        Self(size)
    }

    #[must_use]
    pub const fn size(self) -> u32 {
        self.0.get()
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.get() as usize
    }


    #[must_use]
    pub const fn contains(self, action: ActionId) -> bool {
        action.value() < self.0.get()
    }
}

impl TryFrom<u32> for ActionSpace {
    type Error = LimitsError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActionSpace> for u32 {
    fn from(value: ActionSpace) -> Self {
        value.size()
    }
}

/// Maximum number of speculative (uncommitted) steps retained before the
/// oldest is forced to commit.
///
/// Depth 0 disables shielding: every step commits immediately and unsafe
/// labels are accepted as violations. Depth 1 only retries alternatives at
/// the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShieldDepth(u32);

impl ShieldDepth {
    pub const DISABLED: ShieldDepth = ShieldDepth(0);

    #[must_use]
    pub const fn new(depth: u32) -> Self {
        Self(depth)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_disabled(self) -> bool {
        self.0 == 0
    }

    /// Whether a buffer holding `pending` steps must commit its head before
    /// accepting another.
    #[must_use]
    pub const fn must_commit(self, pending: usize) -> bool {
        pending >= self.0 as usize
    }
}
