// src/exec/lazy.rs

//! Lazy execution and the [`LazyView`] read-through map.
//!
//! Every non-initial node (and every graph producer) becomes a memoized cell.
//! Reading a key plans the unresolved cells it reaches, then evaluates them
//! in waves: a wave only holds cells whose dependencies are memoized by an
//! earlier wave. Cells nobody reads are never computed. Parallel nodes in one
//! wave run on the worker pool at the same time.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use futures_util::future::try_join_all;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::dag::{EvaluationOrder, Graph, Node, NodeValue};
use crate::errors::{GraphError, Result};
use crate::exec::{ExecOptions, Values};

enum LazyCell<V> {
    Ready(V),
    Deferred { node: Node<V>, value: OnceCell<V> },
}

/// Cells are stored dependencies-first: initial cells, then the evaluation order.
struct LazyInner<V> {
    cells: Values<LazyCell<V>>,
    hidden: HashSet<String>,
    options: ExecOptions,
}

/// Read-only, memoizing view over a lazily evaluated graph.
///
/// Cloning the view is cheap and clones share memoized results. A failed
/// computation is not memoized; reading the key again retries it.
pub struct LazyView<V> {
    inner: Arc<LazyInner<V>>,
}

impl<V> Clone for LazyView<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: NodeValue> LazyView<V> {
    /// Build the view for one run. Nothing is computed here.
    pub fn new(
        graph: &Graph<V>,
        order: &EvaluationOrder,
        initial_values: Values<V>,
        keep_initials: bool,
        options: ExecOptions,
    ) -> Self {
        let mut cells = Values::with_capacity(graph.len() + initial_values.len());

        for (name, node) in graph.iter().filter(|(_, node)| node.is_initial()) {
            if initial_values.contains_key(name) {
                continue;
            }
            cells.insert(name.to_string(), deferred_or_ready(node));
        }
        for (name, value) in initial_values {
            cells.insert(name, LazyCell::Ready(value));
        }
        for name in order.keys() {
            if let Some(node) = graph.get(name) {
                cells.insert(
                    name.to_string(),
                    LazyCell::Deferred {
                        node: node.clone(),
                        value: OnceCell::new(),
                    },
                );
            }
        }

        let hidden = if keep_initials {
            HashSet::new()
        } else {
            order.initial_keys().iter().cloned().collect()
        };

        Self {
            inner: Arc::new(LazyInner {
                cells,
                hidden,
                options,
            }),
        }
    }

    /// Value for `key`, computing it (and its dependencies) on first access.
    ///
    /// Returns `Ok(None)` for keys that are not part of the view.
    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        if !self.contains_key(key) {
            return Ok(None);
        }
        self.inner.force(&[key]).await?;
        self.inner.lookup(key, key).map(Some)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.cells.contains_key(key) && !self.inner.hidden.contains(key)
    }

    /// Visible keys: initial keys first, then the evaluation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner
            .cells
            .keys()
            .filter(|k| !self.inner.hidden.contains(*k))
            .map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` already holds a value (without computing anything).
    pub fn is_resolved(&self, key: &str) -> bool {
        self.contains_key(key) && self.inner.peek(key).is_some()
    }

    /// Force every visible key and collect the results.
    pub async fn realize(&self) -> Result<Values<V>> {
        let keys: Vec<&str> = self.keys().collect();
        self.inner.force(&keys).await?;
        keys.into_iter()
            .map(|key| -> Result<(String, V)> {
                Ok((key.to_string(), self.inner.lookup(key, key)?))
            })
            .collect()
    }
}

/// One unresolved cell scheduled by [`LazyInner::plan`].
struct Step<'a, V> {
    key: &'a str,
    node: &'a Node<V>,
    value: &'a OnceCell<V>,
    position: usize,
}

impl<V: NodeValue> LazyInner<V> {
    fn peek(&self, key: &str) -> Option<&V> {
        match self.cells.get(key)? {
            LazyCell::Ready(value) => Some(value),
            LazyCell::Deferred { value, .. } => value.get(),
        }
    }

    fn lookup(&self, key: &str, requested_by: &str) -> Result<V> {
        self.peek(key)
            .cloned()
            .ok_or_else(|| self.missing(requested_by, key))
    }

    fn missing(&self, node: &str, missing: &str) -> GraphError {
        GraphError::MissingDependency {
            node: node.to_string(),
            missing: missing.to_string(),
            available: self.cells.keys().cloned().collect(),
        }
    }

    /// Resolve every cell reachable from `roots`.
    async fn force(&self, roots: &[&str]) -> Result<()> {
        let steps = self.plan(roots)?;
        if steps.is_empty() {
            return Ok(());
        }
        debug!(roots = roots.len(), cells = steps.len(), "resolving deferred cells");

        for wave in waves(steps) {
            try_join_all(wave.into_iter().map(|step| {
                step.value
                    .get_or_try_init(move || self.evaluate(step.key, step.node))
            }))
            .await?;
        }
        Ok(())
    }

    /// Unresolved cells reachable from `roots`, sorted by cell position.
    ///
    /// Walks with an explicit stack and stops at memoized cells. A dependency
    /// with no cell fails the plan before anything runs.
    fn plan<'a>(&'a self, roots: &[&'a str]) -> Result<Vec<Step<'a, V>>> {
        let mut steps = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&'a str> = roots.to_vec();

        while let Some(key) = stack.pop() {
            if !seen.insert(key) {
                continue;
            }
            let Some((position, _, LazyCell::Deferred { node, value })) = self.cells.get_full(key)
            else {
                continue;
            };
            if value.initialized() {
                continue;
            }
            for dep in node.deps() {
                if !self.cells.contains_key(dep.as_str()) {
                    return Err(self.missing(key, dep));
                }
                stack.push(dep.as_str());
            }
            steps.push(Step {
                key,
                node,
                value,
                position,
            });
        }

        steps.sort_by_key(|step| step.position);
        Ok(steps)
    }

    /// Evaluate one cell whose dependencies are already memoized.
    async fn evaluate(&self, key: &str, node: &Node<V>) -> Result<V> {
        let args = node
            .deps()
            .iter()
            .map(|dep| self.lookup(dep, key))
            .collect::<Result<Vec<V>>>()?;

        if node.is_parallel() {
            let timeout = node.timeout().or(self.options.default_timeout);
            let mut task = self
                .options
                .pool
                .dispatch(key, node.clone(), args, timeout)
                .await?;
            return task.join().await;
        }

        debug!(node = %key, "computing deferred node");
        node.evaluate(&args).map_err(|source| GraphError::NodeFailed {
            node: key.to_string(),
            source,
        })
    }
}

/// Group position-sorted steps so each step lands one wave after its deepest
/// planned dependency.
fn waves<V>(steps: Vec<Step<'_, V>>) -> Vec<Vec<Step<'_, V>>> {
    let mut level: HashMap<&str, usize> = HashMap::new();
    let mut waves: Vec<Vec<Step<'_, V>>> = Vec::new();

    for step in steps {
        let depth = step
            .node
            .deps()
            .iter()
            .filter_map(|dep| level.get(dep.as_str()))
            .map(|depth| depth + 1)
            .max()
            .unwrap_or(0);
        level.insert(step.key, depth);
        if waves.len() <= depth {
            waves.resize_with(depth + 1, Vec::new);
        }
        waves[depth].push(step);
    }
    waves
}

fn deferred_or_ready<V: NodeValue>(node: &Node<V>) -> LazyCell<V> {
    match node.computation() {
        crate::dag::Computation::Value(value) => LazyCell::Ready(value.clone()),
        _ => LazyCell::Deferred {
            node: node.clone(),
            value: OnceCell::new(),
        },
    }
}

impl<V: NodeValue + fmt::Debug> fmt::Display for LazyView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Deferred;
        impl fmt::Debug for Deferred {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("<deferred>")
            }
        }

        let mut map = f.debug_map();
        for key in self.keys() {
            match self.inner.peek(key) {
                Some(value) => map.entry(&key, value),
                None => map.entry(&key, &Deferred),
            };
        }
        map.finish()
    }
}

impl<V: NodeValue + fmt::Debug> fmt::Debug for LazyView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyView {self}")
    }
}
