use super::residue::AminoAcid;
use nalgebra::DMatrix;
use serde::Serialize;
use std::collections::BTreeSet;

/// Minimum and (exclusive) maximum sequence separation for medium-range contacts.
pub const MEDIUM_RANGE_MIN_SEPARATION: usize = 3;
pub const MEDIUM_RANGE_MAX_SEPARATION: usize = 8;

const BACKBONE_COUPLING: f64 = 1.0;
const DISULFIDE_COUPLING: f64 = 0.9;
const SALT_BRIDGE_COUPLING: f64 = 0.7;
const HYDROPHOBIC_COUPLING: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Backbone,
    MediumRange,
}

/// Undirected edge between residue indices `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub i: usize,
    pub j: usize,
    pub kind: EdgeKind,
    pub coupling: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraphProperties {
    pub nodes: usize,
    pub edges: usize,
    pub backbone_edges: usize,
    pub medium_range_edges: usize,
    pub density: f64,
    pub average_clustering: f64,
}

/// Connectivity over sequence positions. Built once per sequence, immutable afterwards.
#[derive(Debug, Clone)]
pub struct ResidueGraph {
    residues: Vec<AminoAcid>,
    edges: Vec<Edge>,
    adjacency: Vec<BTreeSet<usize>>,
}

/// Coupling strength of a medium-range contact, or `None` when no rule matches.
/// Takes the strongest applicable rule.
pub fn medium_range_coupling(a: AminoAcid, b: AminoAcid) -> Option<f64> {
    if a == AminoAcid::Cysteine && b == AminoAcid::Cysteine {
        Some(DISULFIDE_COUPLING)
    } else if a.has_opposite_charge(b) {
        Some(SALT_BRIDGE_COUPLING)
    } else if a.is_hydrophobic() && b.is_hydrophobic() {
        Some(HYDROPHOBIC_COUPLING)
    } else {
        None
    }
}

impl ResidueGraph {
    pub fn build(residues: &[AminoAcid]) -> Self {
        let n = residues.len();
        let mut edges = Vec::new();

        for i in 0..n.saturating_sub(1) {
            edges.push(Edge {
                i,
                j: i + 1,
                kind: EdgeKind::Backbone,
                coupling: BACKBONE_COUPLING,
            });
        }

        for i in 0..n {
            let lo = i + MEDIUM_RANGE_MIN_SEPARATION;
            let hi = (i + MEDIUM_RANGE_MAX_SEPARATION).min(n);
            for j in lo..hi {
                if let Some(coupling) = medium_range_coupling(residues[i], residues[j]) {
                    edges.push(Edge {
                        i,
                        j,
                        kind: EdgeKind::MediumRange,
                        coupling,
                    });
                }
            }
        }

        let mut adjacency = vec![BTreeSet::new(); n];
        for edge in &edges {
            adjacency[edge.i].insert(edge.j);
            adjacency[edge.j].insert(edge.i);
        }

        Self {
            residues: residues.to_vec(),
            edges,
            adjacency,
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.residues.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn residues(&self) -> &[AminoAcid] {
        &self.residues
    }

    pub fn residue(&self, index: usize) -> Option<AminoAcid> {
        self.residues.get(index).copied()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(index)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn degree(&self, index: usize) -> usize {
        self.adjacency.get(index).map_or(0, BTreeSet::len)
    }

    pub fn density(&self) -> f64 {
        let n = self.node_count();
        if n <= 1 {
            return 0.0;
        }
        2.0 * self.edge_count() as f64 / (n * (n - 1)) as f64
    }

    pub fn local_clustering(&self, index: usize) -> f64 {
        let Some(neighbors) = self.adjacency.get(index) else {
            return 0.0;
        };
        let k = neighbors.len();
        if k < 2 {
            return 0.0;
        }
        let links = neighbors
            .iter()
            .map(|&u| {
                self.adjacency[u]
                    .iter()
                    .filter(|&&w| w > u && neighbors.contains(&w))
                    .count()
            })
            .sum::<usize>();
        2.0 * links as f64 / (k * (k - 1)) as f64
    }

    pub fn average_clustering(&self) -> f64 {
        let n = self.node_count();
        if n == 0 {
            return 0.0;
        }
        (0..n).map(|i| self.local_clustering(i)).sum::<f64>() / n as f64
    }

    pub fn properties(&self) -> GraphProperties {
        let backbone_edges = self
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Backbone)
            .count();
        GraphProperties {
            nodes: self.node_count(),
            edges: self.edge_count(),
            backbone_edges,
            medium_range_edges: self.edge_count() - backbone_edges,
            density: self.density(),
            average_clustering: self.average_clustering(),
        }
    }

    /// Symmetric normalized Laplacian `I - D^{-1/2} A D^{-1/2}`.
    ///
    /// Isolated nodes get an all-zero row and column, so a single residue yields the
    /// 1x1 zero matrix. With `weighted`, edge couplings replace unit adjacency entries.
    pub fn normalized_laplacian(&self, weighted: bool) -> DMatrix<f64> {
        let n = self.node_count();
        let mut adjacency = DMatrix::<f64>::zeros(n, n);
        for edge in &self.edges {
            let w = if weighted { edge.coupling } else { 1.0 };
            adjacency[(edge.i, edge.j)] = w;
            adjacency[(edge.j, edge.i)] = w;
        }

        let inv_sqrt_degree: Vec<f64> = adjacency
            .row_iter()
            .map(|row| {
                let d = row.sum();
                if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 }
            })
            .collect();

        DMatrix::from_fn(n, n, |r, c| {
            let diagonal = if r == c && inv_sqrt_degree[r] > 0.0 {
                1.0
            } else {
                0.0
            };
            diagonal - inv_sqrt_degree[r] * adjacency[(r, c)] * inv_sqrt_degree[c]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::parse_sequence;

    fn graph_for(sequence: &str) -> ResidueGraph {
        ResidueGraph::build(&parse_sequence(sequence).unwrap())
    }

    #[test]
    fn build_creates_backbone_edges_between_consecutive_residues() {
        let graph = graph_for("GIVE");
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        for (k, edge) in graph.edges().iter().enumerate() {
            assert_eq!((edge.i, edge.j), (k, k + 1));
            assert_eq!(edge.kind, EdgeKind::Backbone);
            assert_eq!(edge.coupling, 1.0);
        }
    }

    #[test]
    fn build_adds_medium_range_edge_for_cysteine_pair() {
        let graph = graph_for("CGGC");
        let medium: Vec<_> = graph
            .edges()
            .iter()
            .filter(|e| e.kind == EdgeKind::MediumRange)
            .collect();
        assert_eq!(medium.len(), 1);
        assert_eq!((medium[0].i, medium[0].j), (0, 3));
        assert_eq!(medium[0].coupling, DISULFIDE_COUPLING);
    }

    #[test]
    fn build_adds_salt_bridge_and_hydrophobic_contacts() {
        let graph = graph_for("KGGEGGGG");
        assert!(
            graph
                .edges()
                .iter()
                .any(|e| (e.i, e.j) == (0, 3) && e.coupling == SALT_BRIDGE_COUPLING)
        );

        let graph = graph_for("LGGGV");
        assert!(
            graph
                .edges()
                .iter()
                .any(|e| (e.i, e.j) == (0, 4) && e.coupling == HYDROPHOBIC_COUPLING)
        );
    }

    #[test]
    fn build_ignores_contacts_outside_medium_range_window() {
        // Separation 2 and separation 8 are both excluded.
        let graph = graph_for("CGCGGGGGC");
        assert!(
            graph
                .edges()
                .iter()
                .filter(|e| e.kind == EdgeKind::MediumRange)
                .all(|e| {
                    let sep = e.j - e.i;
                    (MEDIUM_RANGE_MIN_SEPARATION..MEDIUM_RANGE_MAX_SEPARATION).contains(&sep)
                })
        );
        assert!(!graph.edges().iter().any(|e| (e.i, e.j) == (0, 2)));
        assert!(!graph.edges().iter().any(|e| (e.i, e.j) == (0, 8)));
        assert!(graph.edges().iter().any(|e| (e.i, e.j) == (2, 8)));
    }

    #[test]
    fn build_is_deterministic() {
        let sequence = "MKTAYIAKQRQISFVKSHFSRQLEERLGLIEVQ";
        let a = graph_for(sequence);
        let b = graph_for(sequence);
        assert_eq!(a.edges(), b.edges());
    }

    #[test]
    fn single_residue_graph_has_no_edges_and_zero_laplacian() {
        let graph = graph_for("G");
        assert_eq!(graph.edge_count(), 0);
        let laplacian = graph.normalized_laplacian(false);
        assert_eq!(laplacian.shape(), (1, 1));
        assert_eq!(laplacian[(0, 0)], 0.0);
        assert_eq!(graph.density(), 0.0);
        assert_eq!(graph.average_clustering(), 0.0);
    }

    #[test]
    fn normalized_laplacian_of_path_matches_closed_form() {
        let graph = graph_for("GIV");
        let l = graph.normalized_laplacian(false);
        let off = -1.0 / 2.0_f64.sqrt();
        assert!((l[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((l[(1, 1)] - 1.0).abs() < 1e-12);
        assert!((l[(0, 1)] - off).abs() < 1e-12);
        assert!((l[(1, 0)] - off).abs() < 1e-12);
        assert!(l[(0, 2)].abs() < 1e-12);
        assert_eq!(l, l.transpose());
    }

    #[test]
    fn weighted_laplacian_uses_edge_couplings() {
        let graph = graph_for("CGGC");
        let unweighted = graph.normalized_laplacian(false);
        let weighted = graph.normalized_laplacian(true);
        assert!((unweighted[(0, 3)] - weighted[(0, 3)]).abs() > 1e-6);
    }

    #[test]
    fn properties_report_density_and_clustering() {
        let props = graph_for("GIVE").properties();
        assert_eq!(props.nodes, 4);
        assert_eq!(props.edges, 3);
        assert_eq!(props.backbone_edges, 3);
        assert_eq!(props.medium_range_edges, 0);
        assert!((props.density - 0.5).abs() < 1e-12);
        assert_eq!(props.average_clustering, 0.0);
    }

    #[test]
    fn local_clustering_counts_triangles() {
        // Backbone plus the 0-3 disulfide closes a 4-cycle, which has no triangles.
        let graph = graph_for("CGGC");
        assert_eq!(graph.local_clustering(0), 0.0);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1, 3]);

        let graph = graph_for("CGGCGGC");
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1, 3, 6]);
        assert!((graph.local_clustering(0) - 1.0 / 3.0).abs() < 1e-12);
        assert!(graph.average_clustering() > 0.0);
    }
}
