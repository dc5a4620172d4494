// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error(
        "Invalid graph: {} cycle(s) [{}], invalid identifier(s) {:?}",
        .cycles.len(),
        render_cycles(.cycles),
        .invalid_identifiers
    )]
    InvalidGraph {
        cycles: Vec<Vec<String>>,
        invalid_identifiers: Vec<String>,
    },

    #[error("Node '{node}' depends on '{missing}', which is not available (have: {available:?})")]
    MissingDependency {
        node: String,
        missing: String,
        available: Vec<String>,
    },

    #[error("No initial values: none were supplied and the graph defines none")]
    NoInitialValues,

    #[error("Node '{node}' failed: {source:#}")]
    NodeFailed {
        node: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Background task for node '{node}' did not complete: {message}")]
    BackgroundPanicked { node: String, message: String },

    #[error("Background task for node '{node}' timed out after {after:?}")]
    Timeout { node: String, after: Duration },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GraphError {
    /// Name of the node this error is attributed to, if any.
    pub fn node(&self) -> Option<&str> {
        match self {
            GraphError::MissingDependency { node, .. }
            | GraphError::NodeFailed { node, .. }
            | GraphError::BackgroundPanicked { node, .. }
            | GraphError::Timeout { node, .. } => Some(node),
            _ => None,
        }
    }
}

/// Render cycle paths as `a -> b -> a; c -> c`.
pub fn render_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|path| path.join(" -> "))
        .collect::<Vec<_>>()
        .join("; ")
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_graph_message_lists_cycles() {
        let err = GraphError::InvalidGraph {
            cycles: vec![vec!["a".into(), "b".into(), "a".into()]],
            invalid_identifiers: vec![],
        };
        let msg = err.to_string();
        assert!(msg.contains("1 cycle(s)"));
        assert!(msg.contains("a -> b -> a"));
    }

    #[test]
    fn node_failed_keeps_source_chain() {
        let source = anyhow::anyhow!("division by zero").context("computing mean");
        let err = GraphError::NodeFailed {
            node: "m".into(),
            source,
        };
        assert_eq!(err.node(), Some("m"));
        let msg = err.to_string();
        assert!(msg.contains("computing mean"));
        assert!(msg.contains("division by zero"));
    }
}
