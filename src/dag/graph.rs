// src/dag/graph.rs

use indexmap::IndexMap;
use petgraph::graphmap::DiGraphMap;

use crate::dag::node::Node;

/// Named nodes in insertion order.
///
/// The insertion index of each node is its *sequence number*, used to break
/// ties between nodes of equal depth when ordering. Re-inserting an existing
/// key replaces the node but keeps its original sequence number.
#[derive(Debug, Clone)]
pub struct Graph<V> {
    nodes: IndexMap<String, Node<V>>,
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }
}

impl<V> Graph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, returning the node it replaced (if any).
    pub fn insert(&mut self, name: impl Into<String>, node: Node<V>) -> Option<Node<V>> {
        self.nodes.insert(name.into(), node)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, node: Node<V>) -> Self {
        self.insert(name, node);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Node<V>> {
        self.nodes.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node<V>)> {
        self.nodes.iter().map(|(k, n)| (k.as_str(), n))
    }

    /// Insertion sequence number of a node.
    pub fn sequence_of(&self, name: &str) -> Option<usize> {
        self.nodes.get_index_of(name)
    }

    /// Immediate dependencies of a node (empty for unknown names).
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes.get(name).map(|n| n.deps()).unwrap_or(&[])
    }

    /// Names of the dependency-free nodes, in insertion order.
    pub fn initial_keys(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, node)| node.is_initial())
            .map(|(name, _)| name)
    }

    pub fn has_initial_nodes(&self) -> bool {
        self.nodes.values().any(|n| n.is_initial())
    }

    /// Dependency relation as a petgraph map.
    ///
    /// Edge direction: node -> dependency. Every graph key is a vertex;
    /// dependencies that are not graph keys are left out, since they can only
    /// be satisfied by run-time initial values.
    pub fn dependency_graph(&self) -> DiGraphMap<&str, ()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in self.keys() {
            graph.add_node(name);
        }

        for (name, node) in self.iter() {
            for dep in node.deps() {
                if let Some((dep_key, _)) = self.nodes.get_key_value(dep.as_str()) {
                    graph.add_edge(name, dep_key.as_str(), ());
                }
            }
        }

        graph
    }
}

impl<K, V> FromIterator<(K, Node<V>)> for Graph<V>
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Node<V>)>>(iter: I) -> Self {
        let mut graph = Graph::new();
        for (name, node) in iter {
            graph.insert(name, node);
        }
        graph
    }
}
