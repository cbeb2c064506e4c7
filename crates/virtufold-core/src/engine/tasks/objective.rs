use crate::core::models::graph::GraphProperties;
use crate::engine::state::StateStore;

/// Mean of average clustering and density; fixed for a given graph.
pub fn graph_factor(properties: &GraphProperties) -> f64 {
    (properties.average_clustering + properties.density) / 2.0
}

/// Sum over residues of squared norm times mean virtue score.
pub fn virtue_sum(store: &StateStore) -> f64 {
    store
        .states()
        .iter()
        .map(|s| s.norm_squared() * s.scores.mean())
        .sum()
}

#[inline]
pub fn evaluate(store: &StateStore, graph_factor: f64) -> f64 {
    graph_factor * virtue_sum(store)
}
