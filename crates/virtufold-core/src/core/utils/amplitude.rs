use crate::core::models::basis::BASIS_DIM;
use nalgebra::DVector;
use num_complex::Complex64;

pub type Amplitudes = DVector<Complex64>;

/// Squared norms below this are treated as underflow and left unnormalized.
pub const UNDERFLOW_EPSILON: f64 = 1e-12;

/// Tolerance for the unit-norm invariant on externally observable states.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    Normalized,
    Underflow { norm_squared: f64 },
}

#[inline]
pub fn norm_squared(amplitudes: &Amplitudes) -> f64 {
    amplitudes.iter().map(|c| c.norm_sqr()).sum()
}

/// Rescales to unit squared-magnitude sum in place, unless the vector has collapsed
/// below [`UNDERFLOW_EPSILON`], in which case it is left untouched.
pub fn renormalize(amplitudes: &mut Amplitudes) -> Normalization {
    let n2 = norm_squared(amplitudes);
    if !n2.is_finite() || n2 < UNDERFLOW_EPSILON {
        return Normalization::Underflow { norm_squared: n2 };
    }
    let scale = 1.0 / n2.sqrt();
    amplitudes.iter_mut().for_each(|c| *c *= scale);
    Normalization::Normalized
}

pub fn probabilities(amplitudes: &Amplitudes) -> Vec<f64> {
    amplitudes.iter().map(|c| c.norm_sqr()).collect()
}

pub fn one_hot(index: usize) -> Amplitudes {
    let mut v = Amplitudes::zeros(BASIS_DIM);
    v[index] = Complex64::new(1.0, 0.0);
    v
}

#[inline]
pub fn is_normalized(amplitudes: &Amplitudes) -> bool {
    (norm_squared(amplitudes) - 1.0).abs() < NORMALIZATION_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(values: &[(f64, f64)]) -> Amplitudes {
        Amplitudes::from_iterator(
            values.len(),
            values.iter().map(|&(re, im)| Complex64::new(re, im)),
        )
    }

    #[test]
    fn renormalize_scales_to_unit_norm() {
        let mut v = vector(&[(3.0, 0.0), (0.0, 4.0)]);
        assert_eq!(renormalize(&mut v), Normalization::Normalized);
        assert!((norm_squared(&v) - 1.0).abs() < 1e-12);
        assert!((v[0].re - 0.6).abs() < 1e-12);
        assert!((v[1].im - 0.8).abs() < 1e-12);
    }

    #[test]
    fn renormalize_skips_vectors_below_epsilon() {
        let mut v = vector(&[(1e-8, 0.0), (0.0, 0.0)]);
        let before = v.clone();
        assert!(matches!(
            renormalize(&mut v),
            Normalization::Underflow { .. }
        ));
        assert_eq!(v, before);
    }

    #[test]
    fn probabilities_are_squared_magnitudes() {
        let v = vector(&[(0.6, 0.0), (0.0, 0.8)]);
        let p = probabilities(&v);
        assert!((p[0] - 0.36).abs() < 1e-12);
        assert!((p[1] - 0.64).abs() < 1e-12);
    }

    #[test]
    fn one_hot_is_normalized_and_sparse() {
        let v = one_hot(5);
        assert!(is_normalized(&v));
        assert_eq!(v.len(), BASIS_DIM);
        assert_eq!(v.iter().filter(|c| c.norm_sqr() > 0.0).count(), 1);
        assert_eq!(v[5], Complex64::new(1.0, 0.0));
    }
}
