#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use depgraph::{CompiledGraph, Graph, Node};
use serde_json::{json, Value};

/// Builder for JSON-valued graphs to simplify test setup.
pub struct GraphBuilder {
    graph: Graph<Value>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    pub fn value(mut self, name: &str, value: Value) -> Self {
        self.graph.insert(name, Node::value(value));
        self
    }

    pub fn node(mut self, name: &str, node: Node<Value>) -> Self {
        self.graph.insert(name, node);
        self
    }

    pub fn func<F>(self, name: &str, deps: &[&str], f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let node = Node::function(deps.iter().copied(), f);
        self.node(name, node)
    }

    /// A parallel node that sleeps for `delay` and then sums its numeric deps.
    pub fn slow_sum(self, name: &str, deps: &[&str], delay: Duration) -> Self {
        let node = Node::function(deps.iter().copied(), move |args: &[Value]| {
            thread::sleep(delay);
            sum(args)
        })
        .parallel();
        self.node(name, node)
    }

    /// A parallel node reading `dep` that reports what it saw when it started.
    ///
    /// Its value is `{"input": <dep value>, "started_ms": <ms since origin>}`;
    /// it then sleeps for `delay` before returning.
    pub fn stamped(self, name: &str, dep: &str, delay: Duration, origin: Instant) -> Self {
        let node = Node::function([dep], move |args: &[Value]| {
            let started = origin.elapsed();
            thread::sleep(delay);
            Ok(json!({
                "input": args[0].clone(),
                "started_ms": started.as_millis() as u64,
            }))
        })
        .parallel();
        self.node(name, node)
    }

    pub fn build(self) -> Graph<Value> {
        self.graph
    }

    pub fn compile(self) -> CompiledGraph<Value> {
        CompiledGraph::new(self.graph).expect("Failed to compile graph from builder")
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn as_f64(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow!("expected a number, got {value}"))
}

pub fn as_array(value: &Value) -> Result<&[Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| anyhow!("expected an array, got {value}"))
}

/// Sum of numeric arguments.
pub fn sum(args: &[Value]) -> Result<Value> {
    let mut total = 0.0;
    for arg in args {
        total += as_f64(arg)?;
    }
    Ok(json!(total))
}

/// `[0, 1, .., n - 1]`.
pub fn range(n: usize) -> Value {
    Value::from((0..n).collect::<Vec<_>>())
}

/// `{n: count(xs), m: sum(xs) / n}`.
pub fn mean_graph() -> Graph<Value> {
    GraphBuilder::new()
        .func("n", &["xs"], |args| Ok(json!(as_array(&args[0])?.len())))
        .func("m", &["xs", "n"], |args| {
            let mut total = 0.0;
            for x in as_array(&args[0])? {
                total += as_f64(x)?;
            }
            Ok(json!(total / as_f64(&args[1])?))
        })
        .build()
}
