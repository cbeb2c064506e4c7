use super::Virtue;
use super::reference::ReferenceTable;
use crate::core::models::basis::{BASIS_DIM, BASIS_STATES, ConformationType};
use crate::core::models::residue::AminoAcid;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

/// Physical plausibility: extended and sheet-like states over helices.
const JUSTICE_BASE: [f64; BASIS_DIM] = [0.55, 0.45, 0.30, 0.70, 0.65, 0.60, 0.90, 0.50];
const GLYCINE_LEFT_HANDED_BONUS: f64 = 0.3;
const PROLINE_HELIX_PENALTY: f64 = 0.1;

const TEMPERANCE_STEP: f64 = 0.1;
const PRUDENCE_DECAY: f64 = 0.15;

fn diagonal(values: [f64; BASIS_DIM]) -> DMatrix<Complex64> {
    DMatrix::from_diagonal(&DVector::from_iterator(
        BASIS_DIM,
        values.iter().map(|&w| Complex64::new(w, 0.0)),
    ))
}

pub fn justice_weights(residue: AminoAcid) -> [f64; BASIS_DIM] {
    let mut w = JUSTICE_BASE;
    for (k, basis) in BASIS_STATES.iter().enumerate() {
        match (residue, basis.kind) {
            (AminoAcid::Glycine, ConformationType::LeftHanded) => {
                w[k] += GLYCINE_LEFT_HANDED_BONUS
            }
            (AminoAcid::Proline, ConformationType::AlphaHelix) => w[k] -= PROLINE_HELIX_PENALTY,
            _ => {}
        }
    }
    w
}

pub fn honesty_weights(residue: AminoAcid, reference: &ReferenceTable) -> [f64; BASIS_DIM] {
    let per_type = reference.weights_for(residue);
    BASIS_STATES.map(|basis| per_type[basis.kind.index()])
}

/// `1 - 0.1 k`: lower-index states are treated as more stable.
pub fn temperance_weights() -> [f64; BASIS_DIM] {
    std::array::from_fn(|k| 1.0 - TEMPERANCE_STEP * k as f64)
}

/// `exp(-0.15 k)`: a separate descending preference for quickly converging states.
pub fn prudence_weights() -> [f64; BASIS_DIM] {
    std::array::from_fn(|k| (-PRUDENCE_DECAY * k as f64).exp())
}

/// The KxK Hermitian constraint matrix a virtue assigns to one residue.
pub fn constraint_matrix(
    virtue: Virtue,
    residue: AminoAcid,
    reference: &ReferenceTable,
) -> DMatrix<Complex64> {
    let weights = match virtue {
        Virtue::Justice => justice_weights(residue),
        Virtue::Honesty => honesty_weights(residue, reference),
        Virtue::Temperance => temperance_weights(),
        Virtue::Prudence => prudence_weights(),
    };
    diagonal(weights)
}
