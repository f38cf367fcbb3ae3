//! Verification run: the bounded backtracking search.
//!
//! One `step()` applies a single action and then either backtracks to the
//! newest unexhausted decision point, or accepts the step, commits the
//! oldest pending step once the shield window is full, and records a new
//! decision point.
//!
//! ```text
//! frame <= noop_count          frame > noop_count
//!   NoopPhase  --------------->  ShieldPhase  ------> Terminal
//!        (done or frame > max_frames from either phase)
//! ```
//!
//! Candidates are explored in oracle-preference order and backtracking
//! always rewinds to the most recent unexhausted step, so a run is fully
//! deterministic given a deterministic environment and oracle.

use shield_types::{
    ActionId, Frame, Phase, RunConfig, SearchStats, VerificationReport, Violations,
};
use tracing::Span;

use crate::buffer::{CandidateAdvance, PendingStep, SpeculationBuffer};
use crate::environment::{EnvOperation, Environment};
use crate::errors::ShieldError;
use crate::oracle::{ActionOracle, RankedActions};

/// Whether a run needs more `step()` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Searching,
    Terminated,
}

/// An oracle-chosen action being repeated without consulting the buffer.
#[derive(Debug, Clone, Copy)]
struct ActionHold {
    action: ActionId,
    remaining: u32,
}

/// Mutable search state, dropped once the run concludes.
#[derive(Debug)]
struct Search<C> {
    config: RunConfig,
    buffer: SpeculationBuffer<C>,
    frame: Frame,
    committed_reward: f64,
    violations: Violations,
    stats: SearchStats,
    hold: Option<ActionHold>,
}

impl<C> Search<C> {
    fn phase(&self) -> Phase {
        Phase::of(self.frame, self.config.noop_count())
    }

    /// The action for this frame, and whether it replays a held action
    /// rather than the tail's current candidate.
    fn select_action(&mut self, phase: Phase) -> (ActionId, bool) {
        if phase == Phase::Noop {
            return (ActionId::NOOP, false);
        }
        if let Some(hold) = self.hold.as_mut()
            && hold.remaining > 0
        {
            hold.remaining -= 1;
            return (hold.action, true);
        }
        let action = self.buffer.tail().candidate_action();
        let repeat = self.config.action_repeat();
        self.hold = (repeat > 0).then_some(ActionHold {
            action,
            remaining: repeat,
        });
        (action, false)
    }

    fn step<E, P>(&mut self, env: &mut E, oracle: &P) -> Result<Progress, ShieldError>
    where
        E: Environment<Checkpoint = C>,
        P: ActionOracle<E::Observation> + ?Sized,
    {
        let phase = self.phase();
        let (action, held) = self.select_action(phase);
        // A held action other than the tail's candidate leaves that candidate untried.
        let candidate_untried = held && action != self.buffer.tail().candidate_action();
        let transition = env
            .step(action)
            .map_err(ShieldError::environment(EnvOperation::Step, self.frame))?;
        self.stats.steps += 1;
        if self.config.render() {
            env.render()
                .map_err(ShieldError::environment(EnvOperation::Render, self.frame))?;
        }

        // A proven phase keeps every later label unsafe.
        let proven = self.violations.is_recorded(phase);
        let safe = transition.safe && !proven;

        if !safe && !proven && !self.config.shield_depth().is_disabled() {
            self.backtrack(env, phase, candidate_untried)?;
            return Ok(Progress::Searching);
        }

        if !safe && self.violations.record(phase, self.frame) {
            tracing::debug!(frame = %self.frame, %phase, "unsafe step accepted");
        }

        let checkpoint = env
            .save()
            .map_err(ShieldError::environment(EnvOperation::Save, self.frame))?;
        let ranked = RankedActions::new(
            oracle.rank(&transition.observation),
            self.config.action_space(),
        )
        .map_err(ShieldError::oracle(self.frame))?;

        let commit = self.config.shield_depth().must_commit(self.buffer.len());
        self.buffer
            .push(PendingStep::new(checkpoint, ranked, transition.reward));
        if commit && let Some(horizon) = self.buffer.pop_head() {
            self.committed_reward += horizon.pending_reward();
            self.stats.commits += 1;
        }
        self.stats.max_speculation = self.stats.max_speculation.max(self.buffer.len());
        self.frame = self.frame.next();

        if transition.done || self.frame.value() > self.config.max_frames() {
            return Ok(Progress::Terminated);
        }
        Ok(Progress::Searching)
    }

    /// Rewinds after an unsafe step. With `candidate_untried`, the tail's
    /// current candidate was never applied, so it is retried as is.
    fn backtrack<E>(
        &mut self,
        env: &mut E,
        phase: Phase,
        candidate_untried: bool,
    ) -> Result<(), ShieldError>
    where
        E: Environment<Checkpoint = C>,
    {
        let hazard = self.frame;
        self.stats.backtracks += 1;
        self.hold = None;

        if !candidate_untried {
            while self.buffer.pop_exhausted_tail().is_some() {
                self.frame = self.frame.prev();
            }

            if self.buffer.tail_mut().advance_candidate() == CandidateAdvance::Wrapped {
                self.stats.exhausted_horizons += 1;
                if self.violations.record(phase, hazard) {
                    tracing::debug!(frame = %hazard, %phase, "shield window exhausted");
                }
            }
        }

        env.restore(self.buffer.tail().checkpoint())
            .map_err(ShieldError::environment(EnvOperation::Restore, self.frame))?;
        self.stats.restores += 1;
        tracing::trace!(
            hazard = %hazard,
            resume = %self.frame,
            candidate = self.buffer.tail().candidate_index(),
            "backtracked"
        );
        Ok(())
    }

    fn conclude(self) -> VerificationReport {
        let mut total_reward = self.committed_reward;
        let mut stats = self.stats;
        for pending in self.buffer.into_pending() {
            total_reward += pending.pending_reward();
            stats.commits += 1;
        }
        VerificationReport::new(
            self.config.noop_count(),
            self.config.shield_depth(),
            self.violations,
            total_reward,
            self.frame.elapsed(),
            stats,
        )
    }
}

/// A single bounded search against one environment instance.
///
/// Drive it with [`VerificationRun::step`] until a report is returned, or
/// use [`VerificationRun::run_to_completion`].
pub struct VerificationRun<'o, E, P>
where
    E: Environment,
    P: ?Sized,
{
    oracle: &'o P,
    env: E,
    search: Option<Search<E::Checkpoint>>,
    report: Option<VerificationReport>,
    span: Span,
}

impl<'o, E, P> VerificationRun<'o, E, P>
where
    E: Environment,
    P: ActionOracle<E::Observation> + ?Sized,
{
    /// Resets the environment and records the initial decision point.
    pub fn new(oracle: &'o P, mut env: E, config: RunConfig) -> Result<Self, ShieldError> {
        let span = tracing::debug_span!(
            "verification_run",
            noop_count = config.noop_count(),
            shield_depth = config.shield_depth().value(),
        );
        let frame = Frame::FIRST;
        let observation = env
            .reset()
            .map_err(ShieldError::environment(EnvOperation::Reset, frame))?;
        let checkpoint = env
            .save()
            .map_err(ShieldError::environment(EnvOperation::Save, frame))?;
        let ranked = RankedActions::new(oracle.rank(&observation), config.action_space())
            .map_err(ShieldError::oracle(frame))?;

        let search = Search {
            config,
            buffer: SpeculationBuffer::new(PendingStep::new(checkpoint, ranked, 0.0)),
            frame,
            committed_reward: 0.0,
            violations: Violations::default(),
            stats: SearchStats {
                max_speculation: 1,
                ..SearchStats::default()
            },
            hold: None,
        };
        Ok(Self {
            oracle,
            env,
            search: Some(search),
            report: None,
            span,
        })
    }

    /// Performs one search step.
    ///
    /// Returns `Ok(None)` while the search continues and the report once the
    /// run terminates. Calling `step` after termination returns the same
    /// report again without touching the environment.
    pub fn step(&mut self) -> Result<Option<VerificationReport>, ShieldError> {
        let _entered = self.span.enter();
        let Some(search) = self.search.as_mut() else {
            return Ok(self.report.clone());
        };
        if search.step(&mut self.env, self.oracle)? == Progress::Searching {
            return Ok(None);
        }

        self.report = self.search.take().map(Search::conclude);
        if let Some(report) = &self.report {
            tracing::debug!(
                main_violation = ?report.main_violation_frame(),
                noop_violation = ?report.noop_violation_frame(),
                total_reward = report.total_reward(),
                frames = report.frames_survived(),
                "verification run finished"
            );
        }
        Ok(self.report.clone())
    }

    /// Steps until the run produces its report.
    pub fn run_to_completion(mut self) -> Result<VerificationReport, ShieldError> {
        loop {
            if let Some(report) = self.step()? {
                return Ok(report);
            }
        }
    }

    /// Current search depth; the final frame once the run has finished.
    #[must_use]
    pub fn frame(&self) -> Frame {
        match (&self.search, &self.report) {
            (Some(search), _) => search.frame,
            (None, Some(report)) => Frame::new(report.frames_survived()).next(),
            (None, None) => Frame::FIRST,
        }
    }

    /// Number of pending (uncommitted) steps; 0 once the run has finished.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.search.as_ref().map_or(0, |search| search.buffer.len())
    }

    /// Reward made irrevocable so far.
    #[must_use]
    pub fn committed_reward(&self) -> f64 {
        match (&self.search, &self.report) {
            (Some(search), _) => search.committed_reward,
            (None, Some(report)) => report.total_reward(),
            (None, None) => 0.0,
        }
    }

    #[must_use]
    pub fn violations(&self) -> Option<Violations> {
        self.search.as_ref().map(|search| search.violations)
    }

    /// The commit horizon's candidate index, while the run is active.
    #[must_use]
    pub fn horizon_candidate(&self) -> Option<usize> {
        self.search
            .as_ref()
            .map(|search| search.buffer.head().candidate_index())
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.report.is_some()
    }

    #[must_use]
    pub fn environment(&self) -> &E {
        &self.env
    }

    #[must_use]
    pub fn into_environment(self) -> E {
        self.env
    }
}
