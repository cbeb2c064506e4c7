//! # Core Models Module
//!
//! Data structures describing the input sequence and the space of conformations
//! each residue may adopt.
//!
//! - [`residue`] - The twenty canonical amino acids and their physico-chemical classes
//! - [`basis`] - The fixed, ordered table of eight conformational basis records
//! - [`graph`] - Backbone and medium-range connectivity derived from the sequence
//!
//! ```ignore
//! use virtufold::core::models::{graph::ResidueGraph, residue::parse_sequence};
//!
//! let residues = parse_sequence("GIVEQCCTSICSLYQLENYCN")?;
//! let graph = ResidueGraph::build(&residues);
//! assert_eq!(graph.node_count(), 21);
//! ```

pub mod basis;
pub mod graph;
pub mod residue;
