use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use depgraph::Node;
use serde_json::Value;

/// Counts how many times the nodes it creates are evaluated.
///
/// Cloning shares the counter, so a probe can be moved into node closures
/// while the test keeps a handle to assert on.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    calls: Arc<AtomicUsize>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wrap `f` in a node that bumps the counter on every evaluation.
    pub fn counted<F>(&self, deps: &[&str], f: F) -> Node<Value>
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let calls = Arc::clone(&self.calls);
        Node::function(deps.iter().copied(), move |args: &[Value]| {
            calls.fetch_add(1, Ordering::SeqCst);
            f(args)
        })
    }

    /// A counting producer with no dependencies.
    pub fn counted_producer<F>(&self, f: F) -> Node<Value>
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        let calls = Arc::clone(&self.calls);
        Node::producer(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            f()
        })
    }
}
