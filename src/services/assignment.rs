//! Reviewer selection.
//!
//! Selection is an explicit sampling step over the candidate list read inside
//! the caller's transaction. The randomness source is injected through
//! [`ReviewerSampler`], so tests can make it deterministic.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::ReviewerSlots;

/// Number of reviewer slots on a pull request.
pub const MAX_REVIEWERS: usize = 2;

/// Source of uniform random selections.
pub trait ReviewerSampler: Send + Sync {
    /// Up to `amount` distinct entries of `candidates`, chosen uniformly at
    /// random without replacement, in random order.
    fn sample(&self, candidates: &[Uuid], amount: usize) -> Vec<Uuid>;
}

/// Sampler backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSampler;

impl ReviewerSampler for ThreadRngSampler {
    fn sample(&self, candidates: &[Uuid], amount: usize) -> Vec<Uuid> {
        shuffle_take(&mut rand::thread_rng(), candidates, amount)
    }
}

/// Reproducible sampler seeded with a fixed value.
#[derive(Debug)]
pub struct SeededSampler {
    rng: Mutex<StdRng>,
}

impl SeededSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ReviewerSampler for SeededSampler {
    fn sample(&self, candidates: &[Uuid], amount: usize) -> Vec<Uuid> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        shuffle_take(&mut *rng, candidates, amount)
    }
}

fn shuffle_take<R: Rng + ?Sized>(rng: &mut R, candidates: &[Uuid], amount: usize) -> Vec<Uuid> {
    let mut pool = candidates.to_vec();
    let amount = amount.min(pool.len());
    let (picked, _) = pool.partial_shuffle(rng, amount);
    picked.to_vec()
}

/// Outcome of the creation-time assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub reviewers: ReviewerSlots,
    pub need_more_reviewers: bool,
}

/// Pick up to two reviewers from `candidates`, never `excluded`.
///
/// `candidates` are the active members of the author's team. Fewer than two
/// eligible members leaves slots empty and sets `need_more_reviewers`.
pub fn assign_reviewers(
    candidates: &[Uuid],
    excluded: Uuid,
    sampler: &dyn ReviewerSampler,
) -> Assignment {
    let eligible: Vec<Uuid> = candidates
        .iter()
        .copied()
        .filter(|id| *id != excluded)
        .collect();

    let mut picks = sampler.sample(&eligible, MAX_REVIEWERS);
    picks.truncate(MAX_REVIEWERS);
    picks.dedup();

    Assignment {
        reviewers: ReviewerSlots::from_picks(&picks),
        need_more_reviewers: picks.len() < MAX_REVIEWERS,
    }
}

/// Pick one replacement reviewer from `candidates`, skipping `excluded`.
pub fn pick_replacement(
    candidates: &[Uuid],
    excluded: &[Uuid],
    sampler: &dyn ReviewerSampler,
) -> Option<Uuid> {
    let eligible: Vec<Uuid> = candidates
        .iter()
        .copied()
        .filter(|id| !excluded.contains(id))
        .collect();

    sampler.sample(&eligible, 1).into_iter().next()
}
