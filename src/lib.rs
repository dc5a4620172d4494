// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod demo;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

pub use crate::dag::{
    Computation, EvaluationOrder, Graph, Node, NodeValue, find_cycles, get_cycles,
    is_valid_graph,
};
pub use crate::engine::{CompiledGraph, ComputeMode, RunOutput, compile, is_lazy_view};
pub use crate::errors::GraphError;
pub use crate::exec::{LazyView, Values};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate};
use crate::demo::{Stat, sample_series, statistics_graph};

/// High-level entry point used by `main.rs`.
///
/// Loads the engine config, compiles the sample statistics graph and runs it
/// in the requested mode.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    let graph = statistics_graph();

    if args.dry_run {
        print_dry_run(&graph, &cfg);
        return Ok(());
    }

    let compiled = CompiledGraph::with_config(graph, &cfg.engine)?;
    let inputs = [("xs", sample_series(args.size))];
    let keep_initials = !args.hide_initials;

    if args.lazy {
        let view = compiled.compute_later(inputs, keep_initials)?;
        info!(keys = view.len(), "lazy view ready");
        if let Some(stddev) = view.get("stddev").await? {
            println!("stddev = {stddev}");
        }
        println!("{view}");
    } else {
        let values = compiled.compute_now(inputs, keep_initials).await?;
        for (name, value) in &values {
            println!("{name} = {value}");
        }
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let path = match &args.config {
        Some(path) => PathBuf::from(path),
        None => {
            let default = default_config_path();
            if !default.exists() {
                debug!("no config file; using engine defaults");
                return Ok(ConfigFile::default());
            }
            default
        }
    };

    info!(path = %path.display(), "loading engine config");
    Ok(load_and_validate(&path)?)
}

/// Dry-run output: validity, cycles and evaluation order.
fn print_dry_run(graph: &Graph<Stat>, cfg: &ConfigFile) {
    println!("depgraph dry-run");
    println!("  engine.max_parallel = {:?}", cfg.engine.max_parallel);
    println!("  engine.task_timeout_ms = {:?}", cfg.engine.task_timeout_ms);
    println!();

    println!("nodes ({}):", graph.len());
    for (name, node) in graph.iter() {
        let parallel = if node.is_parallel() { " (parallel)" } else { "" };
        println!("  - {name} <- {:?}{parallel}", node.deps());
    }
    println!();

    if !is_valid_graph(graph) {
        for cycle in find_cycles(graph) {
            println!("cycle: {}", cycle.join(" -> "));
        }
        return;
    }

    let order = EvaluationOrder::compute(graph, &["xs".to_string()].into_iter().collect());
    println!("evaluation order:");
    for entry in order.entries() {
        println!("  {} (depth {})", entry.key, entry.depth);
    }

    debug!("dry-run complete (no execution)");
}
