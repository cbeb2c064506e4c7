use crate::core::utils::amplitude::Amplitudes;
use crate::core::utils::linalg::{LinalgError, quadratic_form};
use crate::core::virtues::operator::{VirtueBank, VirtueOperator};
use crate::engine::error::EngineError;
use crate::engine::state::{StateStore, renormalize_or_warn};
use nalgebra::DMatrix;
use num_complex::Complex64;
use tracing::{instrument, trace};

const PHASE: &str = "virtue projection";

/// Projects every residue onto the operator's accepted eigenspace, renormalizes, and
/// records the residue's score for this virtue.
///
/// Scores are quadratic forms with the operator's aggregate matrix (the sum of all
/// residue constraint matrices), so they grow with sequence length.
#[instrument(level = "debug", skip_all, fields(virtue = %operator.virtue))]
pub fn apply(operator: &VirtueOperator, store: &mut StateStore) -> Result<(), EngineError> {
    store.ensure_active()?;

    let projector = operator.projector();
    let aggregate = operator.aggregate();
    for (index, state) in store.states_mut().iter_mut().enumerate() {
        state.amplitudes = projector * &state.amplitudes;
        ensure_finite(&state.amplitudes)?;
        renormalize_or_warn(index, state, PHASE);
        state.scores[operator.virtue] = score(&state.amplitudes, aggregate)?;
    }

    trace!("Projection applied.");
    Ok(())
}

/// Refreshes all four scores from the current amplitudes without projecting.
pub fn evaluate_scores(bank: &VirtueBank, store: &mut StateStore) -> Result<(), EngineError> {
    store.ensure_active()?;

    for operator in bank.iter() {
        let aggregate = operator.aggregate();
        for state in store.states_mut() {
            state.scores[operator.virtue] = score(&state.amplitudes, aggregate)?;
        }
    }
    Ok(())
}

fn score(amplitudes: &Amplitudes, matrix: &DMatrix<Complex64>) -> Result<f64, EngineError> {
    let value = quadratic_form(amplitudes, matrix);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::numerical(PHASE)(LinalgError::NonFinite {
            operation: "virtue score",
        }))
    }
}

fn ensure_finite(amplitudes: &Amplitudes) -> Result<(), EngineError> {
    if amplitudes
        .iter()
        .all(|c| c.re.is_finite() && c.im.is_finite())
    {
        Ok(())
    } else {
        Err(EngineError::numerical(PHASE)(LinalgError::NonFinite {
            operation: "projector application",
        }))
    }
}
