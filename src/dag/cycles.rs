// src/dag/cycles.rs

//! Cycle detection over the dependency relation.
//!
//! Every node is used as a search root in insertion order. A depth-first walk
//! along dependency edges reports a cycle whenever it reaches the root again,
//! as the path `root, .., root`. The same cycle is therefore reported once
//! per member node; results are not deduplicated by cycle identity.

use std::collections::HashSet;

use petgraph::graphmap::DiGraphMap;

use crate::dag::graph::Graph;

/// All cycles reachable from any root, as identifier paths.
///
/// An empty result means the dependency relation is acyclic.
pub fn find_cycles<V>(graph: &Graph<V>) -> Vec<Vec<String>> {
    let deps = graph.dependency_graph();
    graph
        .keys()
        .flat_map(|root| cycles_through(&deps, root))
        .collect()
}

/// Cycles that start and end at `root`.
///
/// Iterative DFS with an explicit frame stack. Each vertex is expanded at most
/// once per root, which keeps the search linear in the size of the graph.
fn cycles_through<'g>(deps: &DiGraphMap<&'g str, ()>, root: &'g str) -> Vec<Vec<String>> {
    struct Frame<'g> {
        node: &'g str,
        next: Vec<&'g str>,
    }

    let frame_for = |node: &'g str| Frame {
        node,
        // Reverse so that `pop` walks edges in insertion order.
        next: deps.neighbors(node).collect::<Vec<_>>().into_iter().rev().collect(),
    };

    let mut found = Vec::new();
    let mut visited: HashSet<&str> = HashSet::from([root]);
    let mut stack = vec![frame_for(root)];

    while let Some(frame) = stack.last_mut() {
        let Some(dep) = frame.next.pop() else {
            stack.pop();
            continue;
        };

        if dep == root {
            let mut path: Vec<String> = stack.iter().map(|f| f.node.to_string()).collect();
            path.push(root.to_string());
            found.push(path);
            continue;
        }

        if visited.insert(dep) {
            stack.push(frame_for(dep));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::Node;

    fn dep(deps: &[&str]) -> Node<i64> {
        Node::function(deps.iter().copied(), |_| Ok(0))
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let graph = Graph::new()
            .with("a", Node::value(1))
            .with("b", dep(&["a"]))
            .with("c", dep(&["a", "b"]));
        assert!(find_cycles(&graph).is_empty());
    }

    #[test]
    fn three_cycle_is_reported_from_every_member() {
        let graph = Graph::new()
            .with("n", dep(&["m2"]))
            .with("m2", dep(&["v"]))
            .with("v", dep(&["n"]));

        let cycles = find_cycles(&graph);
        assert_eq!(
            cycles,
            vec![
                vec!["n", "m2", "v", "n"],
                vec!["m2", "v", "n", "m2"],
                vec!["v", "n", "m2", "v"],
            ]
        );
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let graph = Graph::new().with("loop_", dep(&["loop_"]));
        assert_eq!(find_cycles(&graph), vec![vec!["loop_", "loop_"]]);
    }
}
