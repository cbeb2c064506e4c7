//! Computational steps of one optimization run.
//!
//! Each submodule operates on a [`StateStore`](super::state::StateStore) in place:
//! virtue projection, graph-coupled evolution, amplitude amplification, and the
//! terminal collapse. [`objective`] turns a store into the scalar progress metric.

pub mod amplification;
pub mod evolution;
pub mod measurement;
pub mod objective;
pub mod projection;
