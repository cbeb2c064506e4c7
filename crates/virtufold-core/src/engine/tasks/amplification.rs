use super::projection;
use crate::core::models::basis::BASIS_DIM;
use crate::core::utils::amplitude::Amplitudes;
use crate::core::virtues::operator::VirtueBank;
use crate::engine::config::AmplificationConfig;
use crate::engine::error::EngineError;
use crate::engine::state::{ScorePredicate, StateStore, renormalize_or_warn};
use num_complex::Complex64;
use tracing::{debug, info, instrument};

const PHASE: &str = "amplitude amplification";

#[derive(Debug, Clone, PartialEq)]
pub struct AmplificationOutcome {
    /// Largest qualifying set seen during the search, in residue order.
    pub best_indices: Vec<usize>,
    /// Oracle/diffusion rounds performed.
    pub iterations: usize,
    pub reached_target: bool,
    /// Size of the best set after each round; never decreases.
    pub best_size_trace: Vec<usize>,
}

/// Residues whose per-residue scores satisfy the predicate.
///
/// Stored scores use the constraint matrix sum, so they are divided by the sequence
/// length before the predicate sees them.
fn qualifying(store: &StateStore, predicate: &ScorePredicate) -> Vec<usize> {
    let per_residue = 1.0 / store.len().max(1) as f64;
    store
        .states()
        .iter()
        .enumerate()
        .filter(|(_, s)| predicate.accepts(&s.scores.scaled(per_residue)))
        .map(|(i, _)| i)
        .collect()
}

/// Negates the full amplitude vector of every marked residue.
fn oracle(store: &mut StateStore, marked: &[usize]) {
    let states = store.states_mut();
    for &index in marked {
        if let Some(state) = states.get_mut(index) {
            state.amplitudes.neg_mut();
        }
    }
}

/// Reflects every residue's amplitude vector about the mean vector across all residues,
/// then renormalizes each one.
fn diffusion(store: &mut StateStore) {
    let n = store.len();
    if n == 0 {
        return;
    }
    let total = store
        .states()
        .iter()
        .fold(Amplitudes::zeros(BASIS_DIM), |acc, s| acc + &s.amplitudes);
    let doubled_mean = total * Complex64::new(2.0 / n as f64, 0.0);

    for (index, state) in store.states_mut().iter_mut().enumerate() {
        state.amplitudes = &doubled_mean - &state.amplitudes;
        renormalize_or_warn(index, state, PHASE);
    }
}

/// Repeated oracle and diffusion rounds biased toward residues whose scores satisfy
/// the configured predicate.
///
/// Stops as soon as the qualifying fraction reaches `target_fraction`, or after
/// `max_iterations` rounds. Falling short of the target is not an error; the best
/// set seen is reported either way.
#[instrument(level = "debug", skip_all, name = "amplification_task")]
pub fn run(
    store: &mut StateStore,
    bank: &VirtueBank,
    config: &AmplificationConfig,
) -> Result<AmplificationOutcome, EngineError> {
    store.ensure_active()?;
    projection::evaluate_scores(bank, store)?;

    let target = config.target_fraction * store.len() as f64;
    let reached = |count: usize| count as f64 >= target;

    let mut best = qualifying(store, &config.predicate);
    let mut best_size_trace = Vec::with_capacity(config.max_iterations);
    let mut iterations = 0;
    let mut reached_target = reached(best.len());

    while !reached_target && iterations < config.max_iterations {
        let marked = qualifying(store, &config.predicate);
        oracle(store, &marked);
        diffusion(store);
        projection::evaluate_scores(bank, store)?;
        iterations += 1;

        let current = qualifying(store, &config.predicate);
        reached_target = reached(current.len());
        if current.len() > best.len() {
            best = current;
        }
        best_size_trace.push(best.len());
    }

    if reached_target {
        debug!(
            iterations,
            qualifying = best.len(),
            "Amplification reached its target fraction."
        );
    } else {
        info!(
            iterations,
            best = best.len(),
            residues = store.len(),
            "Amplification did not reach its target; returning the best set found."
        );
    }

    Ok(AmplificationOutcome {
        best_indices: best,
        iterations,
        reached_target,
        best_size_trace,
    })
}
