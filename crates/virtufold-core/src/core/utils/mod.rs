//! Numerical helpers shared by the virtue bank and the engine tasks.
//!
//! [`amplitude`] owns the per-residue amplitude vector conventions (normalization,
//! underflow detection, probability extraction); [`linalg`] holds the dense
//! Hermitian routines used to derive projectors and evaluate quadratic forms.

pub mod amplitude;
pub mod linalg;
