use super::config::{ComputeDevice, ConfigError, ConfigLoadError};
use super::state::StorePhase;
use super::utils::sampling::SamplingError;
use crate::core::models::residue::SequenceError;
use crate::core::utils::linalg::LinalgError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid sequence: {source}")]
    InvalidSequence {
        #[from]
        source: SequenceError,
    },

    #[error("Numerical instability during {phase}: {source}")]
    NumericalInstability {
        phase: &'static str,
        source: LinalgError,
    },

    #[error("Sampling failed for residue {residue}: {source}")]
    Sampling {
        residue: usize,
        source: SamplingError,
    },

    #[error("State store is {phase:?}; states must be initialized before this operation")]
    StateNotActive { phase: StorePhase },

    #[error("Compute device {device:?} is not available and CPU fallback is disabled")]
    UnsupportedDevice { device: ComputeDevice },

    #[error("Joint state dimension {dimension} exceeds the configured limit of {limit}")]
    DimensionLimitExceeded { dimension: usize, limit: usize },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to load configuration: {source}")]
    ConfigLoad {
        #[from]
        source: ConfigLoadError,
    },
}

impl EngineError {
    pub(crate) fn numerical(phase: &'static str) -> impl FnOnce(LinalgError) -> Self {
        move |source| Self::NumericalInstability { phase, source }
    }

    /// True for failures that invalidate the current run but not the engine; the
    /// caller may re-initialize states and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NumericalInstability { .. } | Self::Sampling { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_errors_convert_into_invalid_sequence() {
        let err: EngineError = SequenceError::Empty.into();
        assert!(matches!(err, EngineError::InvalidSequence { .. }));
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Invalid sequence: Sequence is empty");
    }

    #[test]
    fn numerical_helper_tags_phase() {
        let err = EngineError::numerical("entanglement evolution")(LinalgError::NonFinite {
            operation: "matrix exponential",
        });
        assert!(err.is_retryable());
        assert!(err.to_string().contains("entanglement evolution"));
        assert!(err.to_string().contains("matrix exponential"));
    }
}
