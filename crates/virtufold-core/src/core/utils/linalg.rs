use super::amplitude::Amplitudes;
use nalgebra::DMatrix;
use num_complex::Complex64;
use thiserror::Error;

const EIGEN_EPSILON: f64 = f64::EPSILON;
const EIGEN_MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinalgError {
    #[error("Hermitian eigen-decomposition did not converge")]
    EigenDecomposition,
    #[error("Non-finite values produced by {operation}")]
    NonFinite { operation: &'static str },
}

/// Projector onto the eigenspace of a Hermitian matrix above a cutoff.
#[derive(Debug, Clone)]
pub struct SpectralProjector {
    pub matrix: DMatrix<Complex64>,
    pub eigenvalues: Vec<f64>,
    pub rank: usize,
}

pub fn to_complex(matrix: &DMatrix<f64>) -> DMatrix<Complex64> {
    matrix.map(|x| Complex64::new(x, 0.0))
}

pub fn is_finite(matrix: &DMatrix<Complex64>) -> bool {
    matrix.iter().all(|c| c.re.is_finite() && c.im.is_finite())
}

/// Sums outer products `v v†` of every eigenvector whose eigenvalue exceeds `cutoff`.
///
/// A rank-zero result is returned as-is; deciding how to recover from it is left to
/// the caller.
pub fn spectral_projector(
    hermitian: &DMatrix<Complex64>,
    cutoff: f64,
) -> Result<SpectralProjector, LinalgError> {
    if !is_finite(hermitian) {
        return Err(LinalgError::NonFinite {
            operation: "constraint matrix assembly",
        });
    }

    let dim = hermitian.nrows();
    let eigen = hermitian
        .clone()
        .try_symmetric_eigen(EIGEN_EPSILON, EIGEN_MAX_ITERATIONS)
        .ok_or(LinalgError::EigenDecomposition)?;

    let eigenvalues: Vec<f64> = eigen.eigenvalues.iter().copied().collect();
    if eigenvalues.iter().any(|v| !v.is_finite()) {
        return Err(LinalgError::NonFinite {
            operation: "eigen-decomposition",
        });
    }

    let mut matrix = DMatrix::<Complex64>::zeros(dim, dim);
    let mut rank = 0;
    for (k, &value) in eigenvalues.iter().enumerate() {
        if value > cutoff {
            let v = eigen.eigenvectors.column(k).clone_owned();
            matrix += &v * v.adjoint();
            rank += 1;
        }
    }

    if !is_finite(&matrix) {
        return Err(LinalgError::NonFinite {
            operation: "projector assembly",
        });
    }

    Ok(SpectralProjector {
        matrix,
        eigenvalues,
        rank,
    })
}

/// Real part of `v† M v`.
pub fn quadratic_form(amplitudes: &Amplitudes, matrix: &DMatrix<Complex64>) -> f64 {
    amplitudes.dotc(&(matrix * amplitudes)).re
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn diagonal(values: &[f64]) -> DMatrix<Complex64> {
        to_complex(&DMatrix::from_diagonal(&DVector::from_row_slice(values)))
    }

    #[test]
    fn spectral_projector_keeps_eigenvalues_above_cutoff() {
        let m = diagonal(&[0.9, 0.2, 0.7, 0.1]);
        let projector = spectral_projector(&m, 0.5).unwrap();
        assert_eq!(projector.rank, 2);
        let p = &projector.matrix;
        assert!((p[(0, 0)].re - 1.0).abs() < 1e-10);
        assert!(p[(1, 1)].norm() < 1e-10);
        assert!((p[(2, 2)].re - 1.0).abs() < 1e-10);
        assert!(p[(3, 3)].norm() < 1e-10);
    }

    #[test]
    fn spectral_projector_is_idempotent_and_hermitian() {
        let mut m = diagonal(&[1.0, 0.5, 0.25]);
        m[(0, 1)] = Complex64::new(0.1, 0.2);
        m[(1, 0)] = Complex64::new(0.1, -0.2);
        let projector = spectral_projector(&m, 0.4).unwrap();
        let p = &projector.matrix;
        let p2 = p * p;
        assert!((p2 - p).norm() < 1e-10);
        assert!((p.adjoint() - p).norm() < 1e-10);
    }

    #[test]
    fn spectral_projector_may_be_rank_zero() {
        let m = diagonal(&[0.1, 0.2]);
        let projector = spectral_projector(&m, 1.0).unwrap();
        assert_eq!(projector.rank, 0);
        assert!(projector.matrix.norm() < 1e-12);
    }

    #[test]
    fn spectral_projector_rejects_non_finite_input() {
        let m = diagonal(&[f64::NAN, 1.0]);
        assert!(matches!(
            spectral_projector(&m, 0.0),
            Err(LinalgError::NonFinite { .. })
        ));
    }

    #[test]
    fn quadratic_form_of_diagonal_is_weighted_probability() {
        let m = diagonal(&[2.0, 4.0]);
        let v = DVector::from_vec(vec![
            Complex64::new(0.6, 0.0),
            Complex64::new(0.0, 0.8),
        ]);
        let value = quadratic_form(&v, &m);
        assert!((value - (2.0 * 0.36 + 4.0 * 0.64)).abs() < 1e-12);
    }
}
