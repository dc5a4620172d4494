// src/dag/node.rs

//! Node declarations: a computation plus its explicit dependency list.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Bound shared by every value flowing through a graph.
///
/// Values are cloned into dependents and moved onto worker threads, so they
/// must be `Clone + Send + Sync + 'static`.
pub trait NodeValue: Clone + Send + Sync + 'static {}

impl<T> NodeValue for T where T: Clone + Send + Sync + 'static {}

/// Function over the resolved values of a node's dependencies.
///
/// Arguments arrive in the same order as the node's declared dependencies.
pub type NodeFn<V> = Arc<dyn Fn(&[V]) -> anyhow::Result<V> + Send + Sync>;

/// Zero-argument producer, invoked once per run.
pub type ProducerFn<V> = Arc<dyn Fn() -> anyhow::Result<V> + Send + Sync>;

/// What a node computes.
pub enum Computation<V> {
    /// A precomputed value.
    Value(V),
    /// A producer invoked once per run to yield the node's value.
    Producer(ProducerFn<V>),
    /// A function of the named dependencies.
    Function { deps: Vec<String>, func: NodeFn<V> },
}

impl<V: Clone> Clone for Computation<V> {
    fn clone(&self) -> Self {
        match self {
            Computation::Value(v) => Computation::Value(v.clone()),
            Computation::Producer(f) => Computation::Producer(Arc::clone(f)),
            Computation::Function { deps, func } => Computation::Function {
                deps: deps.clone(),
                func: Arc::clone(func),
            },
        }
    }
}

/// A named computation as stored in a [`Graph`](crate::dag::Graph).
///
/// A node with no dependencies (a value or a producer) is an *initial* node.
#[derive(Clone)]
pub struct Node<V> {
    computation: Computation<V>,
    parallel: bool,
    timeout: Option<Duration>,
}

impl<V> Node<V> {
    /// A literal value.
    pub fn value(value: V) -> Self {
        Self::from_computation(Computation::Value(value))
    }

    /// A zero-argument producer.
    pub fn producer<F>(producer: F) -> Self
    where
        F: Fn() -> anyhow::Result<V> + Send + Sync + 'static,
    {
        Self::from_computation(Computation::Producer(Arc::new(producer)))
    }

    /// A function of the listed dependencies.
    ///
    /// `func` receives the dependency values in the order given by `deps`.
    /// An empty `deps` list makes this equivalent to a producer.
    pub fn function<I, S, F>(deps: I, func: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[V]) -> anyhow::Result<V> + Send + Sync + 'static,
        V: 'static,
    {
        let deps: Vec<String> = deps.into_iter().map(Into::into).collect();
        if deps.is_empty() {
            let func: NodeFn<V> = Arc::new(func);
            return Self::producer(move || func(&[]));
        }
        Self::from_computation(Computation::Function {
            deps,
            func: Arc::new(func),
        })
    }

    fn from_computation(computation: Computation<V>) -> Self {
        Self {
            computation,
            parallel: false,
            timeout: None,
        }
    }

    /// Mark this node for background execution.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Deadline for this node's background task, overriding the engine default.
    ///
    /// Only applies to parallel nodes.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn computation(&self) -> &Computation<V> {
        &self.computation
    }

    /// Declared dependencies, in argument order.
    pub fn deps(&self) -> &[String] {
        match &self.computation {
            Computation::Function { deps, .. } => deps,
            Computation::Value(_) | Computation::Producer(_) => &[],
        }
    }

    /// `true` for nodes without dependencies.
    pub fn is_initial(&self) -> bool {
        self.deps().is_empty()
    }
}

impl<V: Clone> Node<V> {
    /// Run the computation against already-resolved dependency values.
    pub fn evaluate(&self, args: &[V]) -> anyhow::Result<V> {
        match &self.computation {
            Computation::Value(v) => Ok(v.clone()),
            Computation::Producer(f) => f(),
            Computation::Function { func, .. } => func(args),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        match &self.computation {
            Computation::Value(v) => s.field("value", v),
            Computation::Producer(_) => s.field("producer", &"<fn>"),
            Computation::Function { deps, .. } => s.field("deps", deps),
        };
        s.field("parallel", &self.parallel)
            .field("timeout", &self.timeout)
            .finish()
    }
}
