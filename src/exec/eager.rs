// src/exec/eager.rs

//! Eager execution.
//!
//! The orchestrating task walks the evaluation order once. Sequential nodes
//! are computed in place; parallel nodes are handed to the worker pool and
//! kept as [`Slot::Pending`] until a later node needs them or the final pass
//! joins whatever is left. Only the orchestrator writes to the slot map.

use tracing::{debug, info};

use crate::dag::{EvaluationOrder, Graph, Node, NodeValue};
use crate::errors::{GraphError, Result};
use crate::exec::slot::Slot;
use crate::exec::{ExecOptions, Values};

/// Run every node of `graph` now.
///
/// `initial_values` override graph entries of the same name. When
/// `keep_initials` is false the initial identifiers are dropped from the
/// returned map.
pub async fn compute_now<V: NodeValue>(
    graph: &Graph<V>,
    order: &EvaluationOrder,
    initial_values: Values<V>,
    keep_initials: bool,
    options: &ExecOptions,
) -> Result<Values<V>> {
    let mut slots: Values<Slot<V>> = Values::with_capacity(graph.len() + initial_values.len());

    for (name, node) in graph.iter().filter(|(_, node)| node.is_initial()) {
        if initial_values.contains_key(name) {
            continue;
        }
        let slot = start_node(options, name, node, Vec::new()).await?;
        slots.insert(name.to_string(), slot);
    }
    for (name, value) in initial_values {
        slots.insert(name, Slot::Ready(value));
    }

    for entry in order.entries() {
        let name = entry.key.as_str();
        let Some(node) = graph.get(name) else {
            continue;
        };

        let mut args = Vec::with_capacity(node.deps().len());
        for dep in node.deps() {
            let Some(slot) = slots.get_mut(dep) else {
                return Err(GraphError::MissingDependency {
                    node: name.to_string(),
                    missing: dep.clone(),
                    available: slots.keys().cloned().collect(),
                });
            };
            if !slot.is_ready() {
                debug!(node = %name, dependency = %dep, "waiting on background dependency");
            }
            args.push(slot.force().await?.clone());
        }

        let slot = start_node(options, name, node, args).await?;
        slots.insert(name.to_string(), slot);
    }

    let pending = slots.values().filter(|slot| !slot.is_ready()).count();
    if pending > 0 {
        debug!(pending, "joining remaining background tasks");
    }

    let initial_keys = order.initial_keys();
    let mut values = Values::with_capacity(slots.len());
    for (name, slot) in slots {
        let value = slot.resolve().await?;
        if keep_initials || !initial_keys.contains(&name) {
            values.insert(name, value);
        }
    }

    info!(
        nodes = order.len(),
        returned = values.len(),
        "eager run complete"
    );
    Ok(values)
}

/// Compute a node in place, or dispatch it when it is marked parallel.
async fn start_node<V: NodeValue>(
    options: &ExecOptions,
    name: &str,
    node: &Node<V>,
    args: Vec<V>,
) -> Result<Slot<V>> {
    if node.is_parallel() {
        let timeout = node.timeout().or(options.default_timeout);
        let task = options
            .pool
            .dispatch(name, node.clone(), args, timeout)
            .await?;
        return Ok(Slot::Pending(task));
    }

    debug!(node = %name, "computing node");
    node.evaluate(&args)
        .map(Slot::Ready)
        .map_err(|source| GraphError::NodeFailed {
            node: name.to_string(),
            source,
        })
}
