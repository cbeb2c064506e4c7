//! # Virtue Operators
//!
//! Four hand-designed soft constraints over the conformational basis. Each virtue
//! contributes one Hermitian weighting matrix per residue; the matrices are summed
//! into an aggregate whose high-eigenvalue eigenspace defines a projector.
//!
//! - [`weights`] - The per-residue constraint matrices for each virtue
//! - [`reference`] - Optional per-amino-acid reference data consumed by Honesty
//! - [`operator`] - Operator construction and the four-operator bank
//!
//! The weightings are illustrative heuristics, not a validated force field.

pub mod operator;
pub mod reference;
pub mod weights;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Virtue {
    Justice,
    Honesty,
    Temperance,
    Prudence,
}

impl Virtue {
    /// Fixed application order used by every optimization iteration.
    pub const ALL: [Virtue; 4] = [
        Self::Justice,
        Self::Honesty,
        Self::Temperance,
        Self::Prudence,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Justice => "justice",
            Self::Honesty => "honesty",
            Self::Temperance => "temperance",
            Self::Prudence => "prudence",
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Virtue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-residue acceptance thresholds. An aggregate eigenvalue is kept when its
/// per-residue average exceeds the virtue's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtueThresholds {
    pub justice: f64,
    pub honesty: f64,
    pub temperance: f64,
    pub prudence: f64,
}

impl Default for VirtueThresholds {
    fn default() -> Self {
        Self {
            justice: 0.4,
            honesty: 0.5,
            temperance: 0.35,
            prudence: 0.3,
        }
    }
}

impl VirtueThresholds {
    pub fn get(&self, virtue: Virtue) -> f64 {
        match virtue {
            Virtue::Justice => self.justice,
            Virtue::Honesty => self.honesty,
            Virtue::Temperance => self.temperance,
            Virtue::Prudence => self.prudence,
        }
    }

    pub fn set(&mut self, virtue: Virtue, threshold: f64) {
        match virtue {
            Virtue::Justice => self.justice = threshold,
            Virtue::Honesty => self.honesty = threshold,
            Virtue::Temperance => self.temperance = threshold,
            Virtue::Prudence => self.prudence = threshold,
        }
    }
}
