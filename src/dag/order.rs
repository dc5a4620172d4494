// src/dag/order.rs

//! Depth-scored evaluation order.
//!
//! Initial nodes score 0. Any other node scores
//! `max(1 for each initial/unknown dependency, score(dep) + 1 for the rest)`,
//! so a node that only reads initial values scores 1. Non-initial nodes are
//! sorted by `(score, insertion sequence)`, which places every node after all
//! of its dependencies and makes ties reproducible.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::dag::graph::Graph;

/// The set of identifiers treated as initial for a run.
pub type InitialKeys = BTreeSet<String>;

/// One entry of an [`EvaluationOrder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedNode {
    pub key: String,
    pub depth: usize,
    pub sequence: usize,
}

/// Non-initial nodes in dependency order, for one set of initial keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOrder {
    initial_keys: InitialKeys,
    entries: Vec<OrderedNode>,
}

impl EvaluationOrder {
    /// Compute the order of `graph`'s non-initial nodes.
    ///
    /// Keys in `initial_keys` are treated as initial even when the graph
    /// declares dependencies for them (their value is supplied at run time).
    pub fn compute<V>(graph: &Graph<V>, initial_keys: &InitialKeys) -> Self {
        let mut scorer = DepthScorer {
            graph,
            initial_keys,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        };

        let mut entries: Vec<OrderedNode> = graph
            .iter()
            .enumerate()
            .filter(|(_, (name, node))| !node.is_initial() && !initial_keys.contains(*name))
            .map(|(sequence, (name, _))| OrderedNode {
                key: name.to_string(),
                depth: scorer.score(name),
                sequence,
            })
            .collect();

        entries.sort_by_key(|e| (e.depth, e.sequence));

        Self {
            initial_keys: initial_keys.clone(),
            entries,
        }
    }

    pub fn initial_keys(&self) -> &InitialKeys {
        &self.initial_keys
    }

    pub fn entries(&self) -> &[OrderedNode] {
        &self.entries
    }

    /// Ordered node names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct DepthScorer<'a, V> {
    graph: &'a Graph<V>,
    initial_keys: &'a InitialKeys,
    memo: HashMap<&'a str, usize>,
    in_progress: HashSet<&'a str>,
}

impl<'a, V> DepthScorer<'a, V> {
    fn is_initial(&self, name: &str) -> bool {
        self.initial_keys.contains(name)
            || self.graph.get(name).is_none_or(|node| node.is_initial())
    }

    /// Post-order walk with an explicit stack, so chain length never grows
    /// the call stack.
    fn score(&mut self, root: &'a str) -> usize {
        if self.is_initial(root) {
            return 0;
        }

        let graph = self.graph;
        let mut stack: Vec<(&'a str, bool)> = vec![(root, false)];

        while let Some((name, expanded)) = stack.pop() {
            if self.memo.contains_key(name) {
                continue;
            }
            let deps = graph.dependencies_of(name);

            if expanded {
                let depth = deps
                    .iter()
                    .map(|dep| self.dependency_score(dep))
                    .max()
                    .unwrap_or(0);
                self.in_progress.remove(name);
                self.memo.insert(name, depth);
                continue;
            }

            // Back edges only occur in unvalidated graphs; they score as a
            // base dependency.
            if !self.in_progress.insert(name) {
                continue;
            }
            stack.push((name, true));
            for dep in deps {
                let dep = dep.as_str();
                if !self.is_initial(dep)
                    && !self.memo.contains_key(dep)
                    && !self.in_progress.contains(dep)
                {
                    stack.push((dep, false));
                }
            }
        }

        self.memo.get(root).copied().unwrap_or(0)
    }

    fn dependency_score(&self, dep: &str) -> usize {
        if self.is_initial(dep) {
            1
        } else {
            self.memo.get(dep).copied().unwrap_or(0) + 1
        }
    }
}
