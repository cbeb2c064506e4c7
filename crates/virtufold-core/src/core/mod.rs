//! # Core Module
//!
//! Stateless building blocks shared by every optimization run.
//!
//! - **Sequence Representation** ([`models`]) - The amino-acid alphabet, the shared
//!   conformational basis table, and the residue connectivity graph
//! - **Constraint Operators** ([`virtues`]) - The four virtue weighting matrices and
//!   their eigenspace projectors
//! - **Numerical Helpers** ([`utils`]) - Amplitude normalization and small dense
//!   linear-algebra routines
//!
//! Everything in this module is built once per sequence and read-only afterwards.

pub mod models;
pub mod utils;
pub mod virtues;
