use super::reference::ReferenceTable;
use super::weights::constraint_matrix;
use super::{Virtue, VirtueThresholds};
use crate::core::models::basis::BASIS_DIM;
use crate::core::models::residue::AminoAcid;
use crate::core::utils::linalg::{LinalgError, spectral_projector};
use nalgebra::DMatrix;
use num_complex::Complex64;
use tracing::{debug, instrument, warn};

/// A virtue's per-residue constraint matrices together with the projector derived
/// from their aggregate.
#[derive(Debug, Clone)]
pub struct VirtueOperator {
    pub virtue: Virtue,
    pub threshold: f64,
    residue_matrices: Vec<DMatrix<Complex64>>,
    aggregate: DMatrix<Complex64>,
    projector: DMatrix<Complex64>,
    eigenvalues: Vec<f64>,
    rank: usize,
    identity_fallback: bool,
}

impl VirtueOperator {
    #[instrument(level = "debug", skip_all, fields(virtue = %virtue, threshold = threshold))]
    pub fn build(
        virtue: Virtue,
        residues: &[AminoAcid],
        reference: &ReferenceTable,
        threshold: f64,
    ) -> Result<Self, LinalgError> {
        let residue_matrices: Vec<_> = residues
            .iter()
            .map(|&aa| constraint_matrix(virtue, aa, reference))
            .collect();

        let aggregate = residue_matrices.iter().fold(
            DMatrix::<Complex64>::zeros(BASIS_DIM, BASIS_DIM),
            |acc, m| acc + m,
        );

        // Thresholds are per residue; the aggregate scales with sequence length.
        let cutoff = threshold * residues.len().max(1) as f64;
        let spectral = spectral_projector(&aggregate, cutoff)?;

        let (projector, identity_fallback) = if spectral.rank == 0 {
            warn!(
                virtue = %virtue,
                threshold,
                "No eigenvalue of the aggregated constraint matrix exceeds the threshold; substituting the identity projector."
            );
            (DMatrix::<Complex64>::identity(BASIS_DIM, BASIS_DIM), true)
        } else {
            (spectral.matrix, false)
        };

        let rank = if identity_fallback {
            BASIS_DIM
        } else {
            spectral.rank
        };
        debug!(rank, "Virtue projector constructed.");

        Ok(Self {
            virtue,
            threshold,
            residue_matrices,
            aggregate,
            projector,
            eigenvalues: spectral.eigenvalues,
            rank,
            identity_fallback,
        })
    }

    pub fn projector(&self) -> &DMatrix<Complex64> {
        &self.projector
    }

    pub fn aggregate(&self) -> &DMatrix<Complex64> {
        &self.aggregate
    }

    pub fn residue_matrix(&self, index: usize) -> Option<&DMatrix<Complex64>> {
        self.residue_matrices.get(index)
    }

    pub fn residue_matrices(&self) -> &[DMatrix<Complex64>] {
        &self.residue_matrices
    }

    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// True when the projector is the identity substituted for a rank-zero eigenspace.
    pub fn is_identity_fallback(&self) -> bool {
        self.identity_fallback
    }
}

/// The four virtue operators for one sequence, in application order.
#[derive(Debug, Clone)]
pub struct VirtueBank {
    operators: Vec<VirtueOperator>,
}

impl VirtueBank {
    pub fn build(
        residues: &[AminoAcid],
        reference: &ReferenceTable,
        thresholds: &VirtueThresholds,
    ) -> Result<Self, LinalgError> {
        let operators = Virtue::ALL
            .iter()
            .map(|&virtue| {
                VirtueOperator::build(virtue, residues, reference, thresholds.get(virtue))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { operators })
    }

    pub fn get(&self, virtue: Virtue) -> &VirtueOperator {
        &self.operators[virtue.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &VirtueOperator> {
        self.operators.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::parse_sequence;

    fn residues(seq: &str) -> Vec<AminoAcid> {
        parse_sequence(seq).unwrap()
    }

    #[test]
    fn aggregate_is_sum_of_residue_matrices() {
        let seq = residues("GPA");
        let op = VirtueOperator::build(Virtue::Justice, &seq, &ReferenceTable::uniform(), 0.4)
            .unwrap();
        let expected = op.residue_matrix(0).unwrap()
            + op.residue_matrix(1).unwrap()
            + op.residue_matrix(2).unwrap();
        assert!((op.aggregate() - expected).norm() < 1e-12);
        assert!(op.residue_matrix(3).is_none());
    }

    #[test]
    fn justice_projector_drops_pi_helix_at_default_threshold() {
        let seq = residues("AAAA");
        let op = VirtueOperator::build(Virtue::Justice, &seq, &ReferenceTable::uniform(), 0.4)
            .unwrap();
        assert_eq!(op.rank(), BASIS_DIM - 1);
        assert!(op.projector()[(2, 2)].norm() < 1e-10);
        assert!((op.projector()[(6, 6)].re - 1.0).abs() < 1e-10);
        assert!(!op.is_identity_fallback());
    }

    #[test]
    fn threshold_scales_with_sequence_length() {
        let short = residues("A");
        let long = residues("AAAAAAAAAA");
        let reference = ReferenceTable::uniform();
        let a = VirtueOperator::build(Virtue::Temperance, &short, &reference, 0.35).unwrap();
        let b = VirtueOperator::build(Virtue::Temperance, &long, &reference, 0.35).unwrap();
        assert_eq!(a.rank(), b.rank());
        assert_eq!(a.rank(), 7);
    }

    #[test]
    fn rank_zero_projector_falls_back_to_identity() {
        let seq = residues("GIVE");
        let op = VirtueOperator::build(Virtue::Prudence, &seq, &ReferenceTable::uniform(), 5.0)
            .unwrap();
        assert!(op.is_identity_fallback());
        assert_eq!(op.rank(), BASIS_DIM);
        let identity = DMatrix::<Complex64>::identity(BASIS_DIM, BASIS_DIM);
        assert!((op.projector() - identity).norm() < 1e-14);
    }

    #[test]
    fn bank_builds_operators_in_application_order() {
        let seq = residues("GIVE");
        let bank = VirtueBank::build(
            &seq,
            &ReferenceTable::uniform(),
            &VirtueThresholds::default(),
        )
        .unwrap();
        let order: Vec<_> = bank.iter().map(|op| op.virtue).collect();
        assert_eq!(order, Virtue::ALL.to_vec());
        assert_eq!(bank.get(Virtue::Honesty).virtue, Virtue::Honesty);
        assert_eq!(bank.get(Virtue::Honesty).rank(), BASIS_DIM);
    }
}
