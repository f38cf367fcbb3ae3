//! Sweep controller: one verification run per noop count.

use shield_types::{SweepPlan, SweepResult};

use crate::environment::{Environment, EnvironmentError};
use crate::errors::ShieldError;
use crate::oracle::ActionOracle;
use crate::run::VerificationRun;

/// Runs a fresh verification for every noop count in `plan.noops()`, in
/// increasing order.
///
/// `factory` is called once per run and must return an independent
/// environment. With `demand_full_safety`, the sweep stops right after the
/// first report with a main-phase violation; reports collected so far are
/// returned and later noop counts never run. Any contract violation aborts
/// the whole sweep.
pub fn sweep<E, F, P>(
    mut factory: F,
    oracle: &P,
    plan: &SweepPlan,
) -> Result<SweepResult, ShieldError>
where
    E: Environment,
    F: FnMut() -> Result<E, EnvironmentError>,
    P: ActionOracle<E::Observation> + ?Sized,
{
    let mut reports = Vec::with_capacity(plan.noops().len());

    for noop_count in plan.noops() {
        let env = factory()
            .map_err(|source| ShieldError::EnvironmentUnavailable { noop_count, source })?;
        let report = VerificationRun::new(oracle, env, plan.run_config(noop_count))?
            .run_to_completion()?;

        tracing::info!(
            noop_count,
            main_violation = ?report.main_violation_frame(),
            noop_violation = ?report.noop_violation_frame(),
            total_reward = report.total_reward(),
            frames = report.frames_survived(),
            "run complete"
        );

        let unsafe_main = !report.is_main_safe();
        reports.push(report);
        if plan.demand_full_safety() && unsafe_main {
            tracing::warn!(noop_count, "main phase not fully safe; stopping sweep");
            return Ok(SweepResult::new(reports, true));
        }
    }

    Ok(SweepResult::new(reports, false))
}
