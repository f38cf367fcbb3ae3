//! Boundary: the simulated decision process being verified.
//!
//! The core never inspects observations or checkpoints. Checkpoints are
//! values: restoring one must reproduce the exact future behavior of
//! `step`/`save` from that point, no matter how often or in which order
//! checkpoints are restored.

use std::error::Error;
use std::fmt;

use shield_types::ActionId;
use thiserror::Error;

/// Outcome of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<O> {
    pub observation: O,
    pub reward: f64,
    pub done: bool,
    /// Whether the reached state is acceptable. The core does not interpret it.
    pub safe: bool,
}

/// A process that can be stepped, snapshotted and rewound.
pub trait Environment {
    type Observation;
    /// Persistent snapshot. Must not alias live state.
    type Checkpoint: Clone;

    fn reset(&mut self) -> Result<Self::Observation, EnvironmentError>;

    fn step(&mut self, action: ActionId) -> Result<Transition<Self::Observation>, EnvironmentError>;

    fn save(&self) -> Result<Self::Checkpoint, EnvironmentError>;

    fn restore(&mut self, checkpoint: &Self::Checkpoint) -> Result<(), EnvironmentError>;

    /// Visualization hook, called after each step when rendering is enabled.
    fn render(&mut self) -> Result<(), EnvironmentError> {
        Ok(())
    }
}

/// Adapter operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvOperation {
    Reset,
    Step,
    Save,
    Restore,
    Render,
}

impl EnvOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Step => "step",
            Self::Save => "save",
            Self::Restore => "restore",
            Self::Render => "render",
        }
    }
}

impl fmt::Display for EnvOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an environment adapter.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EnvironmentError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl EnvironmentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
