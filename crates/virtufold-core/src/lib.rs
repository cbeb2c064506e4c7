//! # VirtuFold Core Library
//!
//! A conformational search engine that assigns one of eight discrete backbone
//! conformations to every residue of a short peptide. Each residue carries a
//! complex amplitude vector whose squared magnitudes form a probability
//! distribution over the conformations; four hand-designed "virtue" constraints
//! reshape those distributions, a graph-derived unitary step couples neighbouring
//! residues, and a final categorical collapse picks one conformation per residue.
//!
//! The "quantum" vocabulary (state, entanglement, measurement) names ordinary
//! probability vectors and dense linear algebra. Nothing here depends on quantum
//! hardware or a quantum runtime.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless data: the amino-acid alphabet, the
//!   shared basis table, the residue graph, and the virtue operator bank.
//!
//! - **[`engine`]: The Logic Core.** The mutable amplitude store, configuration,
//!   error types, progress reporting, and the individual optimization tasks
//!   (projection, evolution, amplification, measurement, objective).
//!
//! - **[`workflows`]: The Public API.** The [`workflows::optimize::Engine`] ties the
//!   layers together into the iterate/converge/collapse state machine.

pub mod core;
pub mod engine;
pub mod workflows;

pub use engine::config::{ComputeCapability, ComputeDevice, EngineConfig, OptimizationConfig};
pub use engine::error::EngineError;
pub use workflows::optimize::{Engine, OptimizationResult};
