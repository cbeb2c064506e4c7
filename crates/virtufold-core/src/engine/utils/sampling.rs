use rand::{distributions::WeightedIndex, prelude::*};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("Input probability list is empty, cannot perform sampling")]
    EmptyDistribution,
    #[error("Probability list contains a negative or non-finite weight: {0}")]
    InvalidWeight(f64),
    #[error("Failed to create weighted distribution: {source}")]
    DistributionError {
        #[from]
        source: rand::distributions::WeightedError,
    },
}

/// A drawn index together with the normalized probability it was drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub index: usize,
    pub probability: f64,
}

/// Draws one index from unnormalized non-negative weights.
///
/// When the total weight has underflowed the most probable index is returned
/// deterministically, with a warning, instead of failing.
#[instrument(level = "trace", skip_all)]
pub fn categorical_sample(weights: &[f64], rng: &mut impl Rng) -> Result<Draw, SamplingError> {
    if weights.is_empty() {
        return Err(SamplingError::EmptyDistribution);
    }
    if let Some(&bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(SamplingError::InvalidWeight(bad));
    }

    let total: f64 = weights.iter().sum();
    if total <= f64::EPSILON {
        tracing::warn!(
            "Total probability weight is near zero ({}). Falling back to the most probable index.",
            total
        );
        let index = weights
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let probability = if total > 0.0 {
            weights[index] / total
        } else {
            0.0
        };
        return Ok(Draw { index, probability });
    }

    let dist = WeightedIndex::new(weights)?;
    let index = dist.sample(rng);

    Ok(Draw {
        index,
        probability: weights[index] / total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn categorical_sample_rejects_empty_input() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            categorical_sample(&[], &mut rng),
            Err(SamplingError::EmptyDistribution)
        ));
    }

    #[test]
    fn categorical_sample_rejects_negative_weights() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            categorical_sample(&[0.5, -0.1], &mut rng),
            Err(SamplingError::InvalidWeight(w)) if w == -0.1
        ));
    }

    #[test]
    fn categorical_sample_always_picks_certain_outcome() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let draw = categorical_sample(&[0.0, 0.0, 1.0, 0.0], &mut rng).unwrap();
            assert_eq!(draw.index, 2);
            assert_eq!(draw.probability, 1.0);
        }
    }

    #[test]
    fn categorical_sample_normalizes_reported_probability() {
        let mut rng = StdRng::seed_from_u64(9);
        let draw = categorical_sample(&[2.0, 2.0], &mut rng).unwrap();
        assert!((draw.probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn categorical_sample_falls_back_to_argmax_on_underflow() {
        let mut rng = StdRng::seed_from_u64(1);
        let draw = categorical_sample(&[1e-20, 3e-20, 0.0], &mut rng).unwrap();
        assert_eq!(draw.index, 1);
        assert!((draw.probability - 0.75).abs() < 1e-12);
    }

    #[test]
    fn categorical_sample_frequencies_follow_weights() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = [0usize; 2];
        for _ in 0..10_000 {
            counts[categorical_sample(&[0.8, 0.2], &mut rng).unwrap().index] += 1;
        }
        let frequency = counts[0] as f64 / 10_000.0;
        assert!((frequency - 0.8).abs() < 0.03);
    }
}
