//! # Engine Module
//!
//! The state-optimization engine: per-residue amplitude states, the tasks that
//! mutate them, and the configuration, error, and progress types shared by the
//! workflows built on top.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Engine and optimization parameters, TOML loading
//! - **State** ([`state`]) - The residue state arena and virtue scores
//! - **Tasks** ([`tasks`]) - Projection, evolution, amplification, measurement, objective
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! Everything runs on a single thread. Dense linear algebra is done on the CPU even
//! when an accelerator is requested with fallback enabled.

pub mod config;
pub mod error;
pub mod progress;
pub mod state;
pub mod tasks;
pub mod utils;
