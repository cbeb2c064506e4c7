use crate::core::models::graph::{GraphProperties, ResidueGraph};
use crate::core::models::residue::{AminoAcid, parse_sequence};
use crate::core::virtues::operator::VirtueBank;
use crate::engine::config::{
    ComputeCapability, ComputeDevice, EngineConfig, OptimizationConfig,
};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{StateStore, StorePhase};
use crate::engine::tasks::{
    self, evolution::EntanglementEvolver, measurement::ConformationRecord,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Number of iterations between the two objective values compared for convergence.
const CONVERGENCE_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Init,
    Iterating,
    Amplifying,
    Converged,
    MaxIterReached,
    Measured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Converged,
    MaxIterReached,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub converged: bool,
    pub final_status: FinalStatus,
    /// Completed iterations.
    pub iterations: usize,
    /// Objective evaluated on the collapsed states.
    pub final_score: f64,
    /// Objective after each iteration, oldest first.
    pub history: Vec<f64>,
    pub conformations: BTreeMap<usize, ConformationRecord>,
    pub graph_properties: GraphProperties,
}

/// A search engine bound to one sequence.
///
/// The graph, virtue operators, and evolution operator are built once at
/// construction. Each run re-initializes the amplitude store, so one engine can
/// run several independent searches.
pub struct Engine {
    residues: Vec<AminoAcid>,
    graph: ResidueGraph,
    graph_properties: GraphProperties,
    graph_factor: f64,
    bank: VirtueBank,
    evolver: EntanglementEvolver,
    store: StateStore,
    config: EngineConfig,
    controller: ControllerState,
    rng: StdRng,
}

impl Engine {
    pub fn new(sequence: &str, compute: ComputeCapability) -> Result<Self, EngineError> {
        Self::with_config(
            sequence,
            EngineConfig {
                compute,
                ..EngineConfig::default()
            },
        )
    }

    #[instrument(skip_all, name = "engine_construction")]
    pub fn with_config(sequence: &str, config: EngineConfig) -> Result<Self, EngineError> {
        config.optimization.validate()?;
        match config.compute.linalg_device() {
            None => {
                return Err(EngineError::UnsupportedDevice {
                    device: config.compute.device,
                });
            }
            Some(ComputeDevice::Cpu) if config.compute.device != ComputeDevice::Cpu => {
                info!(
                    requested = ?config.compute.device,
                    "Requested device is unavailable; running linear algebra on the CPU."
                );
            }
            Some(_) => {}
        }

        let residues = parse_sequence(sequence)?;
        let graph = ResidueGraph::build(&residues);
        let graph_properties = graph.properties();
        let graph_factor = tasks::objective::graph_factor(&graph_properties);
        info!(
            residues = graph_properties.nodes,
            edges = graph_properties.edges,
            medium_range = graph_properties.medium_range_edges,
            "Residue graph built."
        );

        let reference = config.reference_table()?;
        let bank = VirtueBank::build(&residues, &reference, &config.thresholds)
            .map_err(EngineError::numerical("virtue operator construction"))?;
        let evolver = EntanglementEvolver::new(&graph, &config.evolution)?;
        let store = StateStore::new(&residues);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            residues,
            graph,
            graph_properties,
            graph_factor,
            bank,
            evolver,
            store,
            config,
            controller: ControllerState::Init,
            rng,
        })
    }

    /// Draws fresh random amplitudes for every residue. Safe to call repeatedly;
    /// required again after a run has collapsed the states.
    pub fn initialize_states(&mut self) {
        self.store.initialize(&mut self.rng);
        self.controller = ControllerState::Init;
        debug!(residues = self.store.len(), "States initialized.");
    }

    /// Runs with the engine's configured optimization settings, overriding the
    /// iteration cap and convergence threshold.
    pub fn run_optimization(
        &mut self,
        max_iterations: usize,
        convergence_threshold: f64,
    ) -> Result<OptimizationResult, EngineError> {
        let config = OptimizationConfig {
            max_iterations,
            convergence_threshold,
            ..self.config.optimization
        };
        self.run_with(&config, &ProgressReporter::new())
    }

    #[instrument(skip_all, name = "optimization_workflow", fields(residues = self.residues.len()))]
    pub fn run_with(
        &mut self,
        config: &OptimizationConfig,
        reporter: &ProgressReporter,
    ) -> Result<OptimizationResult, EngineError> {
        config.validate()?;

        // === Phase 0: Initialization ===
        reporter.report(Progress::PhaseStart { name: "Init" });
        self.initialize_states();
        reporter.report(Progress::PhaseFinish);

        // === Phase 1: Iteration ===
        let history = self.iterate(config, reporter)?;
        let converged = self.controller == ControllerState::Converged;

        // === Phase 2: Measurement ===
        reporter.report(Progress::PhaseStart {
            name: "Measurement",
        });
        let conformations = tasks::measurement::collapse(&mut self.store, &mut self.rng)?;
        let final_score = tasks::objective::evaluate(&self.store, self.graph_factor);
        self.controller = ControllerState::Measured;
        reporter.report(Progress::PhaseFinish);

        let result = OptimizationResult {
            converged,
            final_status: if converged {
                FinalStatus::Converged
            } else {
                FinalStatus::MaxIterReached
            },
            iterations: history.len(),
            final_score,
            history,
            conformations,
            graph_properties: self.graph_properties,
        };

        info!(
            converged,
            iterations = result.iterations,
            final_score,
            "Optimization complete."
        );
        Ok(result)
    }

    fn iterate(
        &mut self,
        config: &OptimizationConfig,
        reporter: &ProgressReporter,
    ) -> Result<Vec<f64>, EngineError> {
        reporter.report(Progress::PhaseStart { name: "Iterating" });
        reporter.report(Progress::TaskStart {
            total_steps: config.max_iterations as u64,
        });

        let mut history = Vec::with_capacity(config.max_iterations);
        self.controller = ControllerState::MaxIterReached;

        for iteration in 0..config.max_iterations {
            self.controller = ControllerState::Iterating;
            for operator in self.bank.iter() {
                tasks::projection::apply(operator, &mut self.store)?;
            }
            self.evolver.step(&mut self.store, config.time_step)?;

            if iteration % config.amplification.interval == 0 {
                self.controller = ControllerState::Amplifying;
                let outcome =
                    tasks::amplification::run(&mut self.store, &self.bank, &config.amplification)?;
                debug!(
                    iteration,
                    best = outcome.best_indices.len(),
                    rounds = outcome.iterations,
                    reached_target = outcome.reached_target,
                    "Amplification diagnostics."
                );
                reporter.report(Progress::AmplificationCompleted {
                    iteration,
                    qualifying: outcome.best_indices.len(),
                    rounds: outcome.iterations,
                    reached_target: outcome.reached_target,
                });
            }

            let objective = tasks::objective::evaluate(&self.store, self.graph_factor);
            history.push(objective);
            reporter.report(Progress::IterationCompleted {
                iteration,
                objective,
            });
            reporter.report(Progress::TaskIncrement);

            if has_converged(&history, config.convergence_threshold) {
                info!(
                    iterations = history.len(),
                    objective,
                    "Convergence reached: objective stabilized."
                );
                self.controller = ControllerState::Converged;
                break;
            }
            self.controller = ControllerState::MaxIterReached;
        }

        if self.controller == ControllerState::MaxIterReached {
            info!(
                iterations = history.len(),
                "Maximum iterations reached without convergence."
            );
        }

        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);
        Ok(history)
    }

    pub fn controller_state(&self) -> ControllerState {
        self.controller
    }

    pub fn phase(&self) -> StorePhase {
        self.store.phase()
    }

    pub fn residues(&self) -> &[AminoAcid] {
        &self.residues
    }

    pub fn graph(&self) -> &ResidueGraph {
        &self.graph
    }

    pub fn bank(&self) -> &VirtueBank {
        &self.bank
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// True once more than one window of iterations has completed and the objective
/// moved less than `threshold` across the last window.
fn has_converged(history: &[f64], threshold: f64) -> bool {
    let n = history.len();
    n > CONVERGENCE_WINDOW
        && (history[n - 1] - history[n - 1 - CONVERGENCE_WINDOW]).abs() < threshold
}
