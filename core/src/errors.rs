//! Fatal verification errors.
//!
//! Only collaborator contract breaches are errors. Proven violations and
//! frame-limit exhaustion are reported as data in `VerificationReport`.

use shield_types::Frame;
use thiserror::Error;

use crate::environment::{EnvOperation, EnvironmentError};
use crate::oracle::RankingError;

#[derive(Debug, Error)]
pub enum ShieldError {
    #[error("environment contract violated: {operation} failed at frame {frame}")]
    EnvironmentContract {
        operation: EnvOperation,
        frame: Frame,
        #[source]
        source: EnvironmentError,
    },
    #[error("oracle contract violated at frame {frame}: {violation}")]
    OracleContract {
        frame: Frame,
        #[source]
        violation: RankingError,
    },
    #[error("could not create environment for noop count {noop_count}")]
    EnvironmentUnavailable {
        noop_count: u32,
        #[source]
        source: EnvironmentError,
    },
}

impl ShieldError {
    pub(crate) fn environment(
        operation: EnvOperation,
        frame: Frame,
    ) -> impl FnOnce(EnvironmentError) -> Self {
        move |source| Self::EnvironmentContract {
            operation,
            frame,
            source,
        }
    }

    pub(crate) fn oracle(frame: Frame) -> impl FnOnce(RankingError) -> Self {
        move |violation| Self::OracleContract { frame, violation }
    }

    /// Whether the failure came from the environment adapter.
    #[must_use]
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            Self::EnvironmentContract { .. } | Self::EnvironmentUnavailable { .. }
        )
    }

    #[must_use]
    pub fn is_oracle(&self) -> bool {
        matches!(self, Self::OracleContract { .. })
    }
}
