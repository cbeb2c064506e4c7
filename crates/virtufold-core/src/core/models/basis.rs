use serde::Serialize;
use std::fmt;

/// Number of conformational basis records every residue state spans.
pub const BASIS_DIM: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConformationType {
    AlphaHelix,
    BetaSheet,
    Extended,
    LeftHanded,
}

impl ConformationType {
    pub const ALL: [ConformationType; 4] = [
        Self::AlphaHelix,
        Self::BetaSheet,
        Self::Extended,
        Self::LeftHanded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlphaHelix => "alpha_helix",
            Self::BetaSheet => "beta_sheet",
            Self::Extended => "extended",
            Self::LeftHanded => "left_handed",
        }
    }

    /// Column position of this type in four-wide per-type tables.
    pub fn index(self) -> usize {
        match self {
            Self::AlphaHelix => 0,
            Self::BetaSheet => 1,
            Self::Extended => 2,
            Self::LeftHanded => 3,
        }
    }
}

impl fmt::Display for ConformationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One symbolic backbone conformation, with representative dihedrals in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BasisState {
    pub label: &'static str,
    pub kind: ConformationType,
    pub phi: f64,
    pub psi: f64,
}

/// The shared basis table. Index order is part of the reproducibility contract:
/// virtue weightings, sampling, and recorded results all address records by index.
pub static BASIS_STATES: [BasisState; BASIS_DIM] = [
    BasisState {
        label: "alpha_helix",
        kind: ConformationType::AlphaHelix,
        phi: -57.0,
        psi: -47.0,
    },
    BasisState {
        label: "helix_3_10",
        kind: ConformationType::AlphaHelix,
        phi: -49.0,
        psi: -26.0,
    },
    BasisState {
        label: "pi_helix",
        kind: ConformationType::AlphaHelix,
        phi: -57.0,
        psi: -70.0,
    },
    BasisState {
        label: "beta_antiparallel",
        kind: ConformationType::BetaSheet,
        phi: -139.0,
        psi: 135.0,
    },
    BasisState {
        label: "beta_parallel",
        kind: ConformationType::BetaSheet,
        phi: -119.0,
        psi: 113.0,
    },
    BasisState {
        label: "beta_twisted",
        kind: ConformationType::BetaSheet,
        phi: -100.0,
        psi: 130.0,
    },
    BasisState {
        label: "polyproline_extended",
        kind: ConformationType::Extended,
        phi: -75.0,
        psi: 145.0,
    },
    BasisState {
        label: "left_handed_helix",
        kind: ConformationType::LeftHanded,
        phi: 57.0,
        psi: 47.0,
    },
];

#[inline]
pub fn basis_state(index: usize) -> Option<&'static BasisState> {
    BASIS_STATES.get(index)
}
