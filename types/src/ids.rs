use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of an action in the environment's discrete action space.
///
/// `ActionId::NOOP` (id 0) is the fixed action forced during the noop window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(u32);

impl ActionId {
    pub const NOOP: ActionId = ActionId(0);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ActionId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Search depth along the path currently being explored.
///
/// Advances on every speculative step, retreats when backtracking pops a
/// pending step, and is untouched by commits. Runs start at `Frame::FIRST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame(u64);

impl Frame {
    pub const FIRST: Frame = Frame(1);

    #[must_use]
    pub const fn new(frame: u64) -> Self {
        Self(frame)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Saturates at zero; the run never retreats past its first frame.
    #[must_use]
    pub const fn prev(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Number of steps realized before this frame.
    #[must_use]
    pub const fn elapsed(self) -> u64 {
        self.0.saturating_sub(Self::FIRST.0)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
