//! Utility functions for the engine module.
//!
//! Currently limited to the categorical sampler used by state collapse.

pub mod sampling;
