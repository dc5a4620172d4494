// src/exec/mod.rs

//! Execution layer.
//!
//! - [`pool`] runs parallel nodes on worker threads, optionally bounded and
//!   with per-task deadlines.
//! - [`slot`] is the `Ready | Pending` value slot used by eager runs.
//! - [`eager`] computes every node immediately.
//! - [`lazy`] builds a [`LazyView`] that computes nodes on first read.

use std::time::Duration;

use indexmap::IndexMap;

pub mod eager;
pub mod lazy;
pub mod pool;
pub mod slot;

pub use lazy::LazyView;
pub use pool::{BackgroundTask, WorkerPool};
pub use slot::Slot;

/// Computed values keyed by node name, in evaluation order.
pub type Values<V> = IndexMap<String, V>;

/// Settings shared by both execution modes.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub pool: WorkerPool,
    /// Deadline for parallel nodes that don't set their own.
    pub default_timeout: Option<Duration>,
}
