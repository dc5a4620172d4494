// src/engine/compiled.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::config::{EngineConfig, validate_engine_config};
use crate::dag::{EvaluationOrder, Graph, InitialKeys, NodeValue, validate_graph};
use crate::engine::{ComputeMode, RunOutput};
use crate::errors::{GraphError, Result};
use crate::exec::{ExecOptions, LazyView, Values, eager};

/// Validate `graph` and wrap it for repeated runs.
pub fn compile<V: NodeValue>(graph: Graph<V>) -> Result<CompiledGraph<V>> {
    CompiledGraph::new(graph)
}

/// A validated graph plus its memoized evaluation orders.
///
/// One order is cached per distinct set of initial keys; running with a new
/// set computes (and caches) a new order rather than reusing a stale one.
/// The handle can be shared between concurrent callers.
pub struct CompiledGraph<V> {
    graph: Arc<Graph<V>>,
    orders: Mutex<HashMap<InitialKeys, Arc<EvaluationOrder>>>,
    options: ExecOptions,
}

impl<V: NodeValue> CompiledGraph<V> {
    /// Compile with default settings (unbounded pool, no deadlines).
    pub fn new(graph: Graph<V>) -> Result<Self> {
        Self::with_options(graph, ExecOptions::default())
    }

    /// Compile with settings from an [`EngineConfig`].
    pub fn with_config(graph: Graph<V>, config: &EngineConfig) -> Result<Self> {
        validate_engine_config(config)?;
        Self::with_options(graph, config.exec_options())
    }

    pub fn with_options(graph: Graph<V>, options: ExecOptions) -> Result<Self> {
        validate_graph(&graph)?;
        debug!(
            nodes = graph.len(),
            max_parallel = ?options.pool.limit(),
            "compiled graph"
        );
        Ok(Self {
            graph: Arc::new(graph),
            orders: Mutex::new(HashMap::new()),
            options,
        })
    }

    pub fn graph(&self) -> &Graph<V> {
        &self.graph
    }

    /// Evaluation order for a run whose supplied initial keys are `supplied`.
    ///
    /// The graph's own dependency-free nodes are always initial.
    pub fn evaluation_order<I, S>(&self, supplied: I) -> Arc<EvaluationOrder>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut initial_keys: InitialKeys = supplied.into_iter().map(Into::into).collect();
        initial_keys.extend(self.graph.initial_keys().map(str::to_string));
        self.order_for(initial_keys)
    }

    /// Number of initial-key sets with a cached order.
    pub fn cached_orders(&self) -> usize {
        self.lock_orders().len()
    }

    /// Run every node now and return the realized values.
    pub async fn compute_now<I, K>(&self, initial_values: I, keep_initials: bool) -> Result<Values<V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let initial_values = self.prepare(initial_values)?;
        let order = self.evaluation_order(initial_values.keys().cloned());
        eager::compute_now(self.graph(), &order, initial_values, keep_initials, &self.options).await
    }

    /// Build a [`LazyView`]; nodes compute when first read.
    pub fn compute_later<I, K>(&self, initial_values: I, keep_initials: bool) -> Result<LazyView<V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let initial_values = self.prepare(initial_values)?;
        let order = self.evaluation_order(initial_values.keys().cloned());
        Ok(LazyView::new(
            self.graph(),
            &order,
            initial_values,
            keep_initials,
            self.options.clone(),
        ))
    }

    /// Run in the requested mode.
    pub async fn compute<I, K>(
        &self,
        initial_values: I,
        mode: ComputeMode,
        keep_initials: bool,
    ) -> Result<RunOutput<V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        match mode {
            ComputeMode::Eager => self
                .compute_now(initial_values, keep_initials)
                .await
                .map(RunOutput::Realized),
            ComputeMode::Lazy => self
                .compute_later(initial_values, keep_initials)
                .map(RunOutput::Lazy),
        }
    }

    /// Re-run the graph with no supplied values until `should_continue`
    /// returns false.
    ///
    /// Only useful when the graph's initial nodes are producers with side
    /// effects; results are discarded.
    pub async fn compute_while<F>(&self, mut should_continue: F) -> Result<()>
    where
        F: FnMut() -> bool,
    {
        let mut runs: u64 = 0;
        while should_continue() {
            self.compute_now(Vec::<(String, V)>::new(), false).await?;
            runs += 1;
        }
        info!(runs, "compute_while finished");
        Ok(())
    }

    fn prepare<I, K>(&self, initial_values: I) -> Result<Values<V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let values: Values<V> = initial_values
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();

        if values.is_empty() && !self.graph.has_initial_nodes() {
            return Err(GraphError::NoInitialValues);
        }
        Ok(values)
    }

    fn order_for(&self, initial_keys: InitialKeys) -> Arc<EvaluationOrder> {
        let mut orders = self.lock_orders();
        if let Some(order) = orders.get(&initial_keys) {
            return Arc::clone(order);
        }

        if !orders.is_empty() {
            info!(
                initial_keys = ?initial_keys,
                cached = orders.len(),
                "new set of initial keys; computing another evaluation order"
            );
        }

        let order = Arc::new(EvaluationOrder::compute(self.graph(), &initial_keys));
        debug!(order = ?order.keys().collect::<Vec<_>>(), "evaluation order computed");
        orders.insert(initial_keys, Arc::clone(&order));
        order
    }

    fn lock_orders(&self) -> std::sync::MutexGuard<'_, HashMap<InitialKeys, Arc<EvaluationOrder>>> {
        // Entries are inserted whole; a poisoned cache is still consistent.
        self.orders.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V> fmt::Debug for CompiledGraph<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("nodes", &self.graph.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
