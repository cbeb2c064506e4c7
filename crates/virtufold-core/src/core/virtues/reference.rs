use crate::core::models::basis::ConformationType;
use crate::core::models::residue::AminoAcid;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const UNIFORM_WEIGHTS: [f64; 4] = [1.0; 4];

#[derive(Debug, Deserialize, Clone)]
struct ReferenceRecord {
    residue: String,
    alpha_helix: f64,
    beta_sheet: f64,
    extended: f64,
    left_handed: f64,
}

#[derive(Debug, Error)]
pub enum ReferenceLoadError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Unknown residue '{residue}' in reference data '{path}'")]
    UnknownResidue { path: String, residue: String },
    #[error("Invalid weight {value} for residue '{residue}' in '{path}': weights must be finite and non-negative")]
    InvalidWeight {
        path: String,
        residue: String,
        value: f64,
    },
}

/// Per-amino-acid conformational propensities consumed by the Honesty virtue.
///
/// Residues without an entry fall back to uniform weights, which makes Honesty a
/// plain consistency weighting when no external data is supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    weights: HashMap<AminoAcid, [f64; 4]>,
}

impl ReferenceTable {
    pub fn uniform() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, residue: AminoAcid, weights: [f64; 4]) {
        self.weights.insert(residue, weights);
    }

    pub fn weights_for(&self, residue: AminoAcid) -> [f64; 4] {
        self.weights
            .get(&residue)
            .copied()
            .unwrap_or(UNIFORM_WEIGHTS)
    }

    pub fn weight(&self, residue: AminoAcid, kind: ConformationType) -> f64 {
        self.weights_for(residue)[kind.index()]
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Loads `residue,alpha_helix,beta_sheet,extended,left_handed` rows. The residue
    /// column accepts one- or three-letter codes.
    pub fn load(path: &Path) -> Result<Self, ReferenceLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| ReferenceLoadError::Csv {
                path: path_str.clone(),
                source: e,
            })?;

        let mut table = Self::default();
        for result in reader.deserialize::<ReferenceRecord>() {
            let record = result.map_err(|e| ReferenceLoadError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            let residue: AminoAcid =
                record
                    .residue
                    .parse()
                    .map_err(|_| ReferenceLoadError::UnknownResidue {
                        path: path_str.clone(),
                        residue: record.residue.clone(),
                    })?;
            let weights = [
                record.alpha_helix,
                record.beta_sheet,
                record.extended,
                record.left_handed,
            ];
            if let Some(&bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(ReferenceLoadError::InvalidWeight {
                    path: path_str,
                    residue: record.residue,
                    value: bad,
                });
            }
            table.insert(residue, weights);
        }
        Ok(table)
    }
}
