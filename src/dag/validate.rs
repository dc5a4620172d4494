// src/dag/validate.rs

use std::collections::HashSet;
use std::sync::LazyLock;

use petgraph::algo::toposort;
use regex::Regex;

use crate::dag::cycles::find_cycles;
use crate::dag::graph::Graph;
use crate::errors::{GraphError, Result};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Whether `name` is a well-formed identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Malformed node names and dependency names, in first-seen order.
pub fn invalid_identifiers<V>(graph: &Graph<V>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut invalid = Vec::new();

    for (name, node) in graph.iter() {
        let names = std::iter::once(name).chain(node.deps().iter().map(String::as_str));
        for candidate in names {
            if !is_valid_identifier(candidate) && seen.insert(candidate) {
                invalid.push(candidate.to_string());
            }
        }
    }

    invalid
}

/// `true` if the dependency relation has no cycles.
pub fn is_acyclic<V>(graph: &Graph<V>) -> bool {
    // A topological sort fails if and only if there is a cycle (self loops included).
    toposort(&graph.dependency_graph(), None).is_ok()
}

/// `true` if every identifier is well formed and the graph is acyclic.
pub fn is_valid_graph<V>(graph: &Graph<V>) -> bool {
    invalid_identifiers(graph).is_empty() && is_acyclic(graph)
}

/// Alias of [`find_cycles`].
pub fn get_cycles<V>(graph: &Graph<V>) -> Vec<Vec<String>> {
    find_cycles(graph)
}

/// Structured validation, used when compiling a graph.
pub fn validate_graph<V>(graph: &Graph<V>) -> Result<()> {
    let invalid_identifiers = invalid_identifiers(graph);
    let cycles = if is_acyclic(graph) {
        Vec::new()
    } else {
        find_cycles(graph)
    };

    if invalid_identifiers.is_empty() && cycles.is_empty() {
        return Ok(());
    }

    Err(GraphError::InvalidGraph {
        cycles,
        invalid_identifiers,
    })
}
