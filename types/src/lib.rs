//! Core domain types for the safety-shield verifier.
//!
//! This crate contains pure domain types with no IO and minimal dependencies:
//! identifiers, validated search limits, resolved settings and verification
//! reports. Everything here can be used from any layer of the workspace.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod ids;
mod limits;
mod report;
mod settings;

pub use ids::{ActionId, Frame};
pub use limits::{ActionSpace, LimitsError, ShieldDepth};
pub use report::{Phase, SearchStats, SweepResult, VerificationReport, Violations};
pub use settings::{RunConfig, SweepPlan};
