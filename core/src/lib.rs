//! Bounded speculative safety shield.
//!
//! A [`VerificationRun`] drives an [`Environment`] with actions ranked by an
//! [`ActionOracle`]. Steps stay speculative in a [`SpeculationBuffer`] until
//! the buffer reaches the shield depth; an unsafe step rewinds to the newest
//! checkpoint that still has an untried alternative. [`sweep`] repeats the
//! run across a range of noop counts.

mod buffer;
pub mod environment;
pub mod errors;
pub mod oracle;
mod run;
mod sweep;
#[cfg(test)]
mod test_support;

pub use buffer::{CandidateAdvance, PendingStep, SpeculationBuffer};
pub use environment::{EnvOperation, Environment, EnvironmentError, Transition};
pub use errors::ShieldError;
pub use oracle::{ActionOracle, RankedActions, RankingError};
pub use run::VerificationRun;
pub use sweep::sweep;
