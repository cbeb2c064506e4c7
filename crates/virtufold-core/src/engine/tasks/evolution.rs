use crate::core::models::basis::BASIS_DIM;
use crate::core::models::graph::ResidueGraph;
use crate::core::utils::linalg::{LinalgError, is_finite, to_complex};
use crate::engine::config::EvolutionConfig;
use crate::engine::error::EngineError;
use crate::engine::state::{StateStore, renormalize_or_warn};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use tracing::{debug, instrument, warn};

const PHASE: &str = "entanglement evolution";

/// Couples neighbouring residues through the propagator `exp(-i H dt)` with
/// `H = (-L) ⊗ I_K` built from the normalized graph Laplacian `L`.
///
/// The step forms the full joint state, so each new time step costs an `(N*K)^3`
/// matrix exponential. Propagators are cached per time step.
#[derive(Debug, Clone)]
pub struct EntanglementEvolver {
    laplacian: DMatrix<f64>,
    hamiltonian: DMatrix<Complex64>,
    coupled: bool,
    propagator: Option<(f64, DMatrix<Complex64>)>,
}

impl EntanglementEvolver {
    pub fn new(graph: &ResidueGraph, config: &EvolutionConfig) -> Result<Self, EngineError> {
        let dimension = graph.node_count() * BASIS_DIM;
        if dimension > config.max_joint_dimension {
            if config.strict_dimension_limit {
                return Err(EngineError::DimensionLimitExceeded {
                    dimension,
                    limit: config.max_joint_dimension,
                });
            }
            warn!(
                dimension,
                limit = config.max_joint_dimension,
                "Joint state dimension exceeds the recommended limit; evolution will be slow."
            );
        }

        let laplacian = graph.normalized_laplacian(config.weighted_laplacian);
        let identity = DMatrix::<Complex64>::identity(BASIS_DIM, BASIS_DIM);
        let hamiltonian = (-to_complex(&laplacian)).kronecker(&identity);

        Ok(Self {
            laplacian,
            hamiltonian,
            coupled: graph.edge_count() > 0,
            propagator: None,
        })
    }

    pub fn laplacian(&self) -> &DMatrix<f64> {
        &self.laplacian
    }

    pub fn hamiltonian(&self) -> &DMatrix<Complex64> {
        &self.hamiltonian
    }

    pub fn joint_dimension(&self) -> usize {
        self.hamiltonian.nrows()
    }

    /// Returns `exp(-i H dt)`, computing it only when `dt` differs from the cached step.
    pub fn propagator(&mut self, dt: f64) -> Result<&DMatrix<Complex64>, EngineError> {
        let cached = matches!(
            &self.propagator,
            Some((step, _)) if step.to_bits() == dt.to_bits()
        );
        if !cached {
            debug!(dt, dimension = self.joint_dimension(), "Computing propagator.");
            let generator = self.hamiltonian.clone() * Complex64::new(0.0, -dt);
            let propagator = generator.exp();
            if !is_finite(&propagator) {
                return Err(EngineError::numerical(PHASE)(LinalgError::NonFinite {
                    operation: "matrix exponential",
                }));
            }
            self.propagator = Some((dt, propagator));
        }
        match &self.propagator {
            Some((_, propagator)) => Ok(propagator),
            None => Err(EngineError::numerical(PHASE)(LinalgError::NonFinite {
                operation: "matrix exponential",
            })),
        }
    }

    /// Advances the joint state by one step of length `dt` and renormalizes each residue.
    /// A graph without edges leaves the states untouched.
    #[instrument(level = "debug", skip_all, fields(dt = dt))]
    pub fn step(&mut self, store: &mut StateStore, dt: f64) -> Result<(), EngineError> {
        store.ensure_active()?;
        if !self.coupled {
            return Ok(());
        }

        let n = store.len();
        let joint = DVector::from_iterator(
            n * BASIS_DIM,
            store
                .states()
                .iter()
                .flat_map(|s| s.amplitudes.iter().copied()),
        );
        let evolved = self.propagator(dt)? * joint;
        if evolved.iter().any(|c| !(c.re.is_finite() && c.im.is_finite())) {
            return Err(EngineError::numerical(PHASE)(LinalgError::NonFinite {
                operation: "propagator application",
            }));
        }

        for (index, state) in store.states_mut().iter_mut().enumerate() {
            state.amplitudes = evolved.rows(index * BASIS_DIM, BASIS_DIM).clone_owned();
            renormalize_or_warn(index, state, PHASE);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::parse_sequence;
    use crate::core::utils::amplitude::one_hot;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup(seq: &str, seed: u64) -> (ResidueGraph, StateStore) {
        let residues = parse_sequence(seq).unwrap();
        let graph = ResidueGraph::build(&residues);
        let mut store = StateStore::new(&residues);
        store.initialize(&mut StdRng::seed_from_u64(seed));
        (graph, store)
    }

    #[test]
    fn propagator_is_unitary() {
        let (graph, _) = setup("GIVE", 0);
        let mut evolver = EntanglementEvolver::new(&graph, &EvolutionConfig::default()).unwrap();
        assert_eq!(evolver.joint_dimension(), 4 * BASIS_DIM);
        let u = evolver.propagator(0.1).unwrap().clone();
        let identity = DMatrix::<Complex64>::identity(u.nrows(), u.ncols());
        assert!((u.adjoint() * &u - identity).norm() < 1e-9);
    }

    #[test]
    fn propagator_is_cached_per_time_step() {
        let (graph, _) = setup("GIVE", 0);
        let mut evolver = EntanglementEvolver::new(&graph, &EvolutionConfig::default()).unwrap();
        let a = evolver.propagator(0.1).unwrap().clone();
        let b = evolver.propagator(0.1).unwrap().clone();
        assert_eq!(a, b);
        let c = evolver.propagator(0.2).unwrap().clone();
        assert!((a - c).norm() > 1e-6);
    }

    #[test]
    fn step_keeps_states_normalized() {
        let (graph, mut store) = setup("GIVEQCCTSI", 7);
        let mut evolver = EntanglementEvolver::new(&graph, &EvolutionConfig::default()).unwrap();
        for _ in 0..5 {
            evolver.step(&mut store, 0.1).unwrap();
            assert!(store.is_normalized());
        }
    }

    #[test]
    fn step_mixes_neighbouring_residues() {
        let (graph, mut store) = setup("GI", 0);
        store.states_mut()[0].amplitudes = one_hot(0);
        store.states_mut()[1].amplitudes = one_hot(5);
        let mut evolver = EntanglementEvolver::new(&graph, &EvolutionConfig::default()).unwrap();
        evolver.step(&mut store, 0.5).unwrap();
        let first = store.probabilities(0).unwrap();
        assert!(first[5] > 1e-6);
        assert!(store.is_normalized());
    }

    #[test]
    fn single_residue_step_is_a_no_op() {
        let (graph, mut store) = setup("G", 3);
        let mut evolver = EntanglementEvolver::new(&graph, &EvolutionConfig::default()).unwrap();
        assert_eq!(evolver.laplacian().shape(), (1, 1));
        assert_eq!(evolver.laplacian()[(0, 0)], 0.0);
        let before = store.clone();
        evolver.step(&mut store, 0.1).unwrap();
        assert_eq!(before.states(), store.states());
    }

    #[test]
    fn strict_dimension_limit_rejects_large_graphs() {
        let (graph, _) = setup("GIVEQCCTSI", 0);
        let config = EvolutionConfig {
            max_joint_dimension: 40,
            strict_dimension_limit: true,
            ..EvolutionConfig::default()
        };
        let result = EntanglementEvolver::new(&graph, &config);
        assert!(matches!(
            result,
            Err(EngineError::DimensionLimitExceeded {
                dimension: 80,
                limit: 40
            })
        ));

        let lenient = EvolutionConfig {
            strict_dimension_limit: false,
            ..config
        };
        assert!(EntanglementEvolver::new(&graph, &lenient).is_ok());
    }

    #[test]
    fn step_rejects_collapsed_store() {
        let (graph, mut store) = setup("GIVE", 0);
        store.mark_collapsed();
        let mut evolver = EntanglementEvolver::new(&graph, &EvolutionConfig::default()).unwrap();
        assert!(matches!(
            evolver.step(&mut store, 0.1),
            Err(EngineError::StateNotActive { .. })
        ));
    }
}
