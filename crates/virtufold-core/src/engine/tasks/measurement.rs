use crate::core::models::basis::{BasisState, basis_state};
use crate::core::models::residue::AminoAcid;
use crate::core::utils::amplitude::one_hot;
use crate::engine::error::EngineError;
use crate::engine::state::{StateStore, VirtueScores};
use crate::engine::utils::sampling::{SamplingError, categorical_sample};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// The basis state a residue collapsed to, with the probability it had at collapse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConformationRecord {
    pub residue: AminoAcid,
    pub basis_index: usize,
    pub basis: BasisState,
    pub probability: f64,
    pub virtue_scores: VirtueScores,
}

/// Samples each residue independently from its squared magnitudes and replaces its
/// amplitudes with the drawn one-hot vector. The store is left `Collapsed`.
#[instrument(skip_all, name = "measurement_task")]
pub fn collapse(
    store: &mut StateStore,
    rng: &mut impl Rng,
) -> Result<BTreeMap<usize, ConformationRecord>, EngineError> {
    store.ensure_active()?;

    let mut records = BTreeMap::new();
    for (index, state) in store.states_mut().iter_mut().enumerate() {
        let draw = categorical_sample(&state.probabilities(), rng)
            .map_err(|source| EngineError::Sampling {
                residue: index,
                source,
            })?;
        let basis = basis_state(draw.index)
            .copied()
            .ok_or_else(|| EngineError::Sampling {
                residue: index,
                source: SamplingError::EmptyDistribution,
            })?;

        state.amplitudes = one_hot(draw.index);
        records.insert(
            index,
            ConformationRecord {
                residue: state.residue,
                basis_index: draw.index,
                basis,
                probability: draw.probability,
                virtue_scores: state.scores,
            },
        );
    }

    store.mark_collapsed();
    info!(residues = records.len(), "States collapsed.");
    Ok(records)
}
