//! Speculation buffer: pending steps awaiting commit or discard.
//!
//! # Invariants
//!
//! - The buffer is never empty. The newest entry is held outside the deque,
//!   so an empty buffer is unrepresentable.
//! - Backtracking only removes the tail; commits only remove the head.
//! - Every candidate index stays in `[0, N)`. The only mutators are
//!   [`PendingStep::advance_candidate`], which wraps to 0 instead of
//!   overflowing, and [`PendingStep::reset_candidate`].

use std::collections::VecDeque;
use std::{iter, mem};

use shield_types::ActionId;

use crate::oracle::RankedActions;

/// Result of moving a pending step to its next candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateAdvance {
    Advanced,
    /// Every candidate was tried; the index is back at 0.
    Wrapped,
}

/// One step that can still be retried with another action.
///
/// `checkpoint` is the state *before* the step, so restoring it and applying
/// the current candidate replays the step with that alternative.
#[derive(Debug, Clone)]
pub struct PendingStep<C> {
    checkpoint: C,
    ranked: RankedActions,
    candidate: usize,
    pending_reward: f64,
}

impl<C> PendingStep<C> {
    #[must_use]
    pub fn new(checkpoint: C, ranked: RankedActions, pending_reward: f64) -> Self {
        Self {
            checkpoint,
            ranked,
            candidate: 0,
            pending_reward,
        }
    }

    #[must_use]
    pub fn checkpoint(&self) -> &C {
        &self.checkpoint
    }

    #[must_use]
    pub fn candidate_index(&self) -> usize {
        self.candidate
    }

    /// The action currently being tried from this step's checkpoint.
    #[must_use]
    pub fn candidate_action(&self) -> ActionId {
        self.ranked.as_slice()[self.candidate]
    }

    /// Reward of the step that produced this entry, not yet committed.
    #[must_use]
    pub fn pending_reward(&self) -> f64 {
        self.pending_reward
    }

    /// The least-preferred candidate is being tried.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.candidate + 1 == self.ranked.len()
    }

    pub fn advance_candidate(&mut self) -> CandidateAdvance {
        if self.is_exhausted() {
            self.reset_candidate();
            CandidateAdvance::Wrapped
        } else {
            self.candidate += 1;
            CandidateAdvance::Advanced
        }
    }

    pub fn reset_candidate(&mut self) {
        self.candidate = 0;
    }
}

/// Double-ended queue of pending steps, oldest (the commit horizon) first.
#[derive(Debug, Clone)]
pub struct SpeculationBuffer<C> {
    older: VecDeque<PendingStep<C>>,
    tail: PendingStep<C>,
}

impl<C> SpeculationBuffer<C> {
    #[must_use]
    pub fn new(root: PendingStep<C>) -> Self {
        Self {
            older: VecDeque::new(),
            tail: root,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.older.len() + 1
    }

    /// Always `false`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The commit horizon.
    #[must_use]
    pub fn head(&self) -> &PendingStep<C> {
        self.older.front().unwrap_or(&self.tail)
    }

    /// The newest decision point.
    #[must_use]
    pub fn tail(&self) -> &PendingStep<C> {
        &self.tail
    }

    pub fn tail_mut(&mut self) -> &mut PendingStep<C> {
        &mut self.tail
    }

    pub fn push(&mut self, step: PendingStep<C>) {
        let previous = mem::replace(&mut self.tail, step);
        self.older.push_back(previous);
    }

    /// Removes the head unless it is the only entry.
    pub fn pop_head(&mut self) -> Option<PendingStep<C>> {
        self.older.pop_front()
    }

    /// Discards the tail if it has no alternatives left and an older entry
    /// can take its place. The horizon itself is never discarded.
    pub fn pop_exhausted_tail(&mut self) -> Option<PendingStep<C>> {
        if !self.tail.is_exhausted() {
            return None;
        }
        let older = self.older.pop_back()?;
        Some(mem::replace(&mut self.tail, older))
    }

    /// Iterates head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &PendingStep<C>> {
        self.older.iter().chain(iter::once(&self.tail))
    }

    /// Consumes the buffer head to tail, the order entries are committed in.
    pub fn into_pending(self) -> impl Iterator<Item = PendingStep<C>> {
        self.older.into_iter().chain(iter::once(self.tail))
    }
}
