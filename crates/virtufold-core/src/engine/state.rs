use super::error::EngineError;
use crate::core::models::basis::BASIS_DIM;
use crate::core::models::residue::AminoAcid;
use crate::core::utils::amplitude::{self, Amplitudes, Normalization};
use crate::core::virtues::Virtue;
use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VirtueScores {
    pub justice: f64,
    pub honesty: f64,
    pub temperance: f64,
    pub prudence: f64,
}

impl VirtueScores {
    pub fn new(justice: f64, honesty: f64, temperance: f64, prudence: f64) -> Self {
        Self {
            justice,
            honesty,
            temperance,
            prudence,
        }
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        (self.justice + self.honesty + self.temperance + self.prudence) / 4.0
    }

    pub fn min(&self) -> f64 {
        self.as_array().into_iter().fold(f64::INFINITY, f64::min)
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.justice, self.honesty, self.temperance, self.prudence]
    }

    /// Every score multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.justice * factor,
            self.honesty * factor,
            self.temperance * factor,
            self.prudence * factor,
        )
    }
}

impl Index<Virtue> for VirtueScores {
    type Output = f64;

    fn index(&self, virtue: Virtue) -> &f64 {
        match virtue {
            Virtue::Justice => &self.justice,
            Virtue::Honesty => &self.honesty,
            Virtue::Temperance => &self.temperance,
            Virtue::Prudence => &self.prudence,
        }
    }
}

impl IndexMut<Virtue> for VirtueScores {
    fn index_mut(&mut self, virtue: Virtue) -> &mut f64 {
        match virtue {
            Virtue::Justice => &mut self.justice,
            Virtue::Honesty => &mut self.honesty,
            Virtue::Temperance => &mut self.temperance,
            Virtue::Prudence => &mut self.prudence,
        }
    }
}

/// Decides whether a residue's four virtue scores qualify it during amplification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScorePredicate {
    /// Mean of the four scores strictly above `threshold`.
    MeanAbove { threshold: f64 },
    /// Every score strictly above `threshold`.
    AllAbove { threshold: f64 },
    /// Weighted sum (Justice, Honesty, Temperance, Prudence order) strictly above `threshold`.
    Weighted { weights: [f64; 4], threshold: f64 },
}

impl ScorePredicate {
    pub fn accepts(&self, scores: &VirtueScores) -> bool {
        match *self {
            Self::MeanAbove { threshold } => scores.mean() > threshold,
            Self::AllAbove { threshold } => scores.min() > threshold,
            Self::Weighted { weights, threshold } => {
                let total: f64 = weights
                    .iter()
                    .zip(scores.as_array())
                    .map(|(w, s)| w * s)
                    .sum();
                total > threshold
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Uninitialized,
    Active,
    Collapsed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResidueState {
    pub residue: AminoAcid,
    pub amplitudes: Amplitudes,
    pub scores: VirtueScores,
}

impl ResidueState {
    fn new(residue: AminoAcid) -> Self {
        Self {
            residue,
            amplitudes: Amplitudes::zeros(BASIS_DIM),
            scores: VirtueScores::default(),
        }
    }

    pub fn probabilities(&self) -> Vec<f64> {
        amplitude::probabilities(&self.amplitudes)
    }

    pub fn norm_squared(&self) -> f64 {
        amplitude::norm_squared(&self.amplitudes)
    }
}

/// Arena of per-residue states, indexed by sequence position.
#[derive(Debug, Clone)]
pub struct StateStore {
    states: Vec<ResidueState>,
    phase: StorePhase,
}

impl StateStore {
    pub fn new(residues: &[AminoAcid]) -> Self {
        Self {
            states: residues.iter().map(|&aa| ResidueState::new(aa)).collect(),
            phase: StorePhase::Uninitialized,
        }
    }

    /// Draws fresh Gaussian amplitudes for every residue and normalizes them.
    /// Previous amplitudes and scores are discarded.
    pub fn initialize(&mut self, rng: &mut impl Rng) {
        for state in &mut self.states {
            state.amplitudes = Amplitudes::from_fn(BASIS_DIM, |_, _| {
                Complex64::new(rng.sample(StandardNormal), rng.sample(StandardNormal))
            });
            state.scores = VirtueScores::default();
            amplitude::renormalize(&mut state.amplitudes);
        }
        self.phase = StorePhase::Active;
    }

    #[inline]
    pub fn phase(&self) -> StorePhase {
        self.phase
    }

    pub fn ensure_active(&self) -> Result<(), EngineError> {
        match self.phase {
            StorePhase::Active => Ok(()),
            phase => Err(EngineError::StateNotActive { phase }),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<&ResidueState> {
        self.states.get(index)
    }

    pub fn states(&self) -> &[ResidueState] {
        &self.states
    }

    pub fn amplitudes(&self, index: usize) -> Option<&Amplitudes> {
        self.states.get(index).map(|s| &s.amplitudes)
    }

    pub fn scores(&self, index: usize) -> Option<&VirtueScores> {
        self.states.get(index).map(|s| &s.scores)
    }

    pub fn probabilities(&self, index: usize) -> Option<Vec<f64>> {
        self.states.get(index).map(ResidueState::probabilities)
    }

    pub fn norm_squared(&self, index: usize) -> Option<f64> {
        self.states.get(index).map(ResidueState::norm_squared)
    }

    pub(crate) fn states_mut(&mut self) -> &mut [ResidueState] {
        &mut self.states
    }

    pub(crate) fn mark_collapsed(&mut self) {
        self.phase = StorePhase::Collapsed;
    }

    /// True when every residue satisfies the unit-norm invariant.
    pub fn is_normalized(&self) -> bool {
        self.states
            .iter()
            .all(|s| amplitude::is_normalized(&s.amplitudes))
    }
}

/// Renormalizes one residue after a mutating step, warning instead of dividing by
/// a vanishing norm. Returns `false` on underflow.
pub(crate) fn renormalize_or_warn(
    index: usize,
    state: &mut ResidueState,
    operation: &'static str,
) -> bool {
    match amplitude::renormalize(&mut state.amplitudes) {
        Normalization::Normalized => true,
        Normalization::Underflow { norm_squared } => {
            warn!(
                residue = index,
                operation,
                norm_squared,
                "Amplitude underflow; skipping renormalization for this residue."
            );
            false
        }
    }
}
