// src/dag/mod.rs

//! Graph declaration, validation and ordering.
//!
//! - [`node`] declares computations and their explicit dependencies.
//! - [`graph`] holds the insertion-ordered node map.
//! - [`validate`] checks identifiers and acyclicity.
//! - [`cycles`] reports cycle paths for diagnostics.
//! - [`order`] computes the depth-scored evaluation order.

pub mod cycles;
pub mod graph;
pub mod node;
pub mod order;
pub mod validate;

pub use cycles::find_cycles;
pub use graph::Graph;
pub use node::{Computation, Node, NodeFn, NodeValue, ProducerFn};
pub use order::{EvaluationOrder, InitialKeys, OrderedNode};
pub use validate::{get_cycles, is_valid_graph, is_valid_identifier, validate_graph};
