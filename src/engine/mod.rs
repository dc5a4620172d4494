// src/engine/mod.rs

//! Compiled graphs and run entry points.
//!
//! [`CompiledGraph`] owns a validated graph and caches its evaluation orders.
//! Runs are either eager (a realized [`Values`] map) or lazy (a [`LazyView`]).

use std::any::Any;

use crate::dag::NodeValue;
use crate::exec::{LazyView, Values};

pub mod compiled;

pub use compiled::{CompiledGraph, compile};

/// How a run evaluates its nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeMode {
    #[default]
    Eager,
    Lazy,
}

/// Result of [`CompiledGraph::compute`].
pub enum RunOutput<V> {
    Realized(Values<V>),
    Lazy(LazyView<V>),
}

impl<V: NodeValue> RunOutput<V> {
    pub fn is_lazy_view(&self) -> bool {
        matches!(self, RunOutput::Lazy(_))
    }

    /// Realized values, forcing a lazy view if necessary.
    pub async fn into_values(self) -> crate::errors::Result<Values<V>> {
        match self {
            RunOutput::Realized(values) => Ok(values),
            RunOutput::Lazy(view) => view.realize().await,
        }
    }
}

/// `true` if `value` is a [`LazyView`] over values of type `V`.
pub fn is_lazy_view<V: NodeValue>(value: &dyn Any) -> bool {
    value.is::<LazyView<V>>()
}
