// tests/order_properties.rs

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;

use depgraph::{CompiledGraph, Graph, Node, get_cycles, is_valid_graph};

/// Dependency lists for `node_i`, each only pointing at `node_j` with `j < i`
/// (or at the external input `seed`), which keeps the graph acyclic.
fn dag_strategy(max_nodes: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_nodes).prop_flat_map(|num_nodes| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..4),
            num_nodes,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, picks)| {
                    // Index `i` stands for `seed`; anything below is an earlier node.
                    let deps: BTreeSet<usize> = picks.into_iter().map(|p| p % (i + 1)).collect();
                    deps.into_iter().collect()
                })
                .collect()
        })
    })
}

fn dep_name(i: usize, dep: usize) -> String {
    if dep == i {
        "seed".to_string()
    } else {
        format!("node_{dep}")
    }
}

/// `node_i = i + sum(deps)`, with `seed` as the only input.
fn build_graph(deps: &[Vec<usize>], insertion: &[usize]) -> Graph<i64> {
    let mut graph = Graph::new();
    for &i in insertion {
        let names: Vec<String> = deps[i].iter().map(|&d| dep_name(i, d)).collect();
        let offset = i as i64;
        let node = if names.is_empty() {
            Node::value(offset)
        } else {
            Node::function(names, move |args: &[i64]| Ok(offset + args.iter().sum::<i64>()))
        };
        graph.insert(format!("node_{i}"), node);
    }
    graph
}

/// Straightforward recursive evaluation used as the oracle.
fn reference(deps: &[Vec<usize>], seed: i64) -> HashMap<String, i64> {
    let mut values: Vec<i64> = Vec::with_capacity(deps.len());
    for (i, node_deps) in deps.iter().enumerate() {
        let total: i64 = node_deps
            .iter()
            .map(|&d| if d == i { seed } else { values[d] })
            .sum();
        values.push(i as i64 + total);
    }
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (format!("node_{i}"), v))
        .collect()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
}

proptest! {
    #[test]
    fn generated_dags_are_valid(deps in dag_strategy(12)) {
        let order: Vec<usize> = (0..deps.len()).collect();
        let graph = build_graph(&deps, &order);
        prop_assert!(is_valid_graph(&graph));
        prop_assert!(get_cycles(&graph).is_empty());
    }

    #[test]
    fn order_places_dependencies_first(deps in dag_strategy(12)) {
        let order: Vec<usize> = (0..deps.len()).rev().collect();
        let compiled = CompiledGraph::new(build_graph(&deps, &order)).unwrap();
        let evaluation = compiled.evaluation_order(["seed"]);

        let position: HashMap<&str, usize> = evaluation
            .keys()
            .enumerate()
            .map(|(pos, key)| (key, pos))
            .collect();

        for entry in evaluation.entries() {
            for dep in compiled.graph().dependencies_of(&entry.key) {
                if let Some(&dep_pos) = position.get(dep.as_str()) {
                    prop_assert!(dep_pos < position[entry.key.as_str()]);
                }
            }
        }
    }

    #[test]
    fn computed_values_match_reference(
        deps in dag_strategy(12),
        seed in -1000i64..1000,
        shuffle in any::<u64>(),
    ) {
        let expected = reference(&deps, seed);

        // Rotate the insertion order: values must not depend on it.
        let n = deps.len();
        let rotation = (shuffle as usize) % n;
        let insertion: Vec<usize> = (0..n).map(|i| (i + rotation) % n).collect();

        let compiled = CompiledGraph::new(build_graph(&deps, &insertion)).unwrap();
        let rt = runtime();
        let values = rt
            .block_on(compiled.compute_now([("seed", seed)], true))
            .unwrap();
        let lazy = rt
            .block_on(async { compiled.compute_later([("seed", seed)], true)?.realize().await })
            .unwrap();

        prop_assert_eq!(values.len(), n + 1);
        prop_assert_eq!(values.get("seed"), Some(&seed));
        for (name, value) in values.iter().filter(|(name, _)| name.as_str() != "seed") {
            prop_assert_eq!(Some(value), expected.get(name));
            prop_assert_eq!(Some(value), lazy.get(name));
        }
    }
}
