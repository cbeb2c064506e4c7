use super::state::ScorePredicate;
use crate::core::virtues::VirtueThresholds;
use crate::core::virtues::reference::{ReferenceLoadError, ReferenceTable};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1e-6;
pub const DEFAULT_TIME_STEP: f64 = 0.1;
pub const DEFAULT_AMPLIFICATION_INTERVAL: usize = 10;
/// Compared against per-residue scores (stored scores divided by sequence length).
pub const DEFAULT_AMPLIFICATION_THRESHOLD: f64 = 0.75;
pub const DEFAULT_AMPLIFICATION_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_AMPLIFICATION_TARGET_FRACTION: f64 = 0.8;
pub const DEFAULT_MAX_JOINT_DIMENSION: usize = 512;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Reference data error: {source}")]
    Reference {
        #[from]
        source: ReferenceLoadError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeDevice {
    #[default]
    Cpu,
    Accelerator,
}

/// Where tensor work is requested to run.
///
/// Only the CPU backend is compiled in. `cpu_linalg_fallback` decides whether an
/// accelerator request degrades to the CPU for the eigen-decomposition and
/// matrix-exponential steps or is rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComputeCapability {
    pub device: ComputeDevice,
    pub cpu_linalg_fallback: bool,
}

impl Default for ComputeCapability {
    fn default() -> Self {
        Self::cpu()
    }
}

impl ComputeCapability {
    pub fn cpu() -> Self {
        Self {
            device: ComputeDevice::Cpu,
            cpu_linalg_fallback: true,
        }
    }

    pub fn accelerator(cpu_linalg_fallback: bool) -> Self {
        Self {
            device: ComputeDevice::Accelerator,
            cpu_linalg_fallback,
        }
    }

    /// The device dense linear algebra will actually run on, or `None` when the
    /// request cannot be honoured.
    pub fn linalg_device(&self) -> Option<ComputeDevice> {
        match (self.device, self.cpu_linalg_fallback) {
            (ComputeDevice::Cpu, _) => Some(ComputeDevice::Cpu),
            (ComputeDevice::Accelerator, true) => Some(ComputeDevice::Cpu),
            (ComputeDevice::Accelerator, false) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Use edge coupling strengths as Laplacian weights instead of unit adjacency.
    pub weighted_laplacian: bool,
    /// Joint dimension (residues x basis size) above which the (N*K)^3 matrix
    /// exponential is considered too expensive.
    pub max_joint_dimension: usize,
    /// Fail construction instead of warning when the limit is exceeded.
    pub strict_dimension_limit: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            weighted_laplacian: false,
            max_joint_dimension: DEFAULT_MAX_JOINT_DIMENSION,
            strict_dimension_limit: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AmplificationConfig {
    pub interval: usize,
    pub predicate: ScorePredicate,
    pub max_iterations: usize,
    pub target_fraction: f64,
}

impl Default for AmplificationConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_AMPLIFICATION_INTERVAL,
            predicate: ScorePredicate::MeanAbove {
                threshold: DEFAULT_AMPLIFICATION_THRESHOLD,
            },
            max_iterations: DEFAULT_AMPLIFICATION_MAX_ITERATIONS,
            target_fraction: DEFAULT_AMPLIFICATION_TARGET_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    pub max_iterations: usize,
    pub convergence_threshold: f64,
    pub time_step: f64,
    pub amplification: AmplificationConfig,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            time_step: DEFAULT_TIME_STEP,
            amplification: AmplificationConfig::default(),
        }
    }
}

impl OptimizationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name, reason: &str| {
            Err(ConfigError::InvalidParameter {
                name,
                reason: reason.to_string(),
            })
        };
        if self.max_iterations == 0 {
            return invalid("max_iterations", "must be at least 1");
        }
        if !(self.convergence_threshold.is_finite() && self.convergence_threshold >= 0.0) {
            return invalid("convergence_threshold", "must be finite and non-negative");
        }
        if !self.time_step.is_finite() {
            return invalid("time_step", "must be finite");
        }
        if self.amplification.interval == 0 {
            return invalid("amplification.interval", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.amplification.target_fraction) {
            return invalid("amplification.target_fraction", "must lie in [0, 1]");
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct OptimizationConfigBuilder {
    max_iterations: Option<usize>,
    convergence_threshold: Option<f64>,
    time_step: Option<f64>,
    amplification_interval: Option<usize>,
    amplification_predicate: Option<ScorePredicate>,
    amplification_max_iterations: Option<usize>,
    amplification_target_fraction: Option<f64>,
}

impl OptimizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = Some(threshold);
        self
    }
    pub fn time_step(mut self, dt: f64) -> Self {
        self.time_step = Some(dt);
        self
    }
    pub fn amplification_interval(mut self, interval: usize) -> Self {
        self.amplification_interval = Some(interval);
        self
    }
    pub fn amplification_predicate(mut self, predicate: ScorePredicate) -> Self {
        self.amplification_predicate = Some(predicate);
        self
    }
    pub fn amplification_max_iterations(mut self, iterations: usize) -> Self {
        self.amplification_max_iterations = Some(iterations);
        self
    }
    pub fn amplification_target_fraction(mut self, fraction: f64) -> Self {
        self.amplification_target_fraction = Some(fraction);
        self
    }

    pub fn build(self) -> Result<OptimizationConfig, ConfigError> {
        let defaults = AmplificationConfig::default();
        let config = OptimizationConfig {
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            convergence_threshold: self
                .convergence_threshold
                .unwrap_or(DEFAULT_CONVERGENCE_THRESHOLD),
            time_step: self.time_step.unwrap_or(DEFAULT_TIME_STEP),
            amplification: AmplificationConfig {
                interval: self.amplification_interval.unwrap_or(defaults.interval),
                predicate: self.amplification_predicate.unwrap_or(defaults.predicate),
                max_iterations: self
                    .amplification_max_iterations
                    .unwrap_or(defaults.max_iterations),
                target_fraction: self
                    .amplification_target_fraction
                    .unwrap_or(defaults.target_fraction),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// Everything fixed at engine construction time.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for amplitude initialization and collapse sampling. Runs with the same
    /// seed, sequence, and parameters are reproducible; `None` draws from entropy.
    pub seed: Option<u64>,
    pub compute: ComputeCapability,
    pub thresholds: VirtueThresholds,
    pub evolution: EvolutionConfig,
    /// CSV of per-amino-acid conformational propensities for the Honesty virtue.
    pub reference_data: Option<PathBuf>,
    pub optimization: OptimizationConfig,
}

impl EngineConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| ConfigLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn reference_table(&self) -> Result<ReferenceTable, ConfigLoadError> {
        match &self.reference_data {
            Some(path) => Ok(ReferenceTable::load(path)?),
            None => Ok(ReferenceTable::uniform()),
        }
    }
}
