// src/exec/pool.rs

//! Worker pool for parallel nodes.
//!
//! Parallel computations run on Tokio's blocking thread pool. When a limit is
//! configured, a semaphore permit is acquired before dispatch and moved into
//! the worker, so at most `limit` computations run at once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::dag::{Node, NodeValue};
use crate::errors::{GraphError, Result};

#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    permits: Option<Arc<Semaphore>>,
    limit: Option<usize>,
}

impl WorkerPool {
    /// No limit on concurrently running parallel nodes.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// At most `limit` parallel nodes run at once (`limit` is clamped to 1).
    pub fn bounded(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Some(Arc::new(Semaphore::new(limit))),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Start `node` on a worker with its resolved arguments.
    ///
    /// Waits for a free slot when the pool is bounded. The deadline, if any,
    /// starts counting once the task is actually dispatched.
    pub async fn dispatch<V: NodeValue>(
        &self,
        name: &str,
        node: Node<V>,
        args: Vec<V>,
        timeout: Option<Duration>,
    ) -> Result<BackgroundTask<V>> {
        let permit = match &self.permits {
            Some(permits) => Some(
                Arc::clone(permits)
                    .acquire_owned()
                    .await
                    .map_err(|e| GraphError::Other(e.into()))?,
            ),
            None => None,
        };

        debug!(node = %name, ?timeout, "dispatching background task");

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            node.evaluate(&args)
        });

        Ok(BackgroundTask {
            node: name.to_string(),
            handle,
            deadline: timeout.map(|after| (Instant::now() + after, after)),
        })
    }
}

/// In-flight computation of a parallel node.
pub struct BackgroundTask<V> {
    node: String,
    handle: JoinHandle<anyhow::Result<V>>,
    deadline: Option<(Instant, Duration)>,
}

impl<V> BackgroundTask<V> {
    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task, honouring its deadline.
    ///
    /// Failures keep the original error as `source`; a panic or cancellation
    /// of the worker becomes [`GraphError::BackgroundPanicked`].
    pub async fn join(&mut self) -> Result<V> {
        let joined = match self.deadline {
            Some((deadline, after)) => {
                match tokio::time::timeout_at(deadline, &mut self.handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        return Err(GraphError::Timeout {
                            node: self.node.clone(),
                            after,
                        });
                    }
                }
            }
            None => (&mut self.handle).await,
        };

        match joined {
            Ok(Ok(value)) => {
                debug!(node = %self.node, "background task joined");
                Ok(value)
            }
            Ok(Err(source)) => Err(GraphError::NodeFailed {
                node: self.node.clone(),
                source,
            }),
            Err(join_err) => Err(GraphError::BackgroundPanicked {
                node: self.node.clone(),
                message: join_err.to_string(),
            }),
        }
    }
}

impl<V> fmt::Debug for BackgroundTask<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundTask")
            .field("node", &self.node)
            .field("finished", &self.handle.is_finished())
            .finish_non_exhaustive()
    }
}
