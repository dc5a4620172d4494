// tests/eager_compute.rs

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::bail;
use serde_json::{Value, json};

use depgraph::{CompiledGraph, GraphError, Node, compile};
use depgraph_test_utils::builders::{GraphBuilder, as_f64, mean_graph, range, sum};
use depgraph_test_utils::init_tracing;
use depgraph_test_utils::probe::CallCounter;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn mean_graph_keeps_initials_by_default() -> TestResult {
    init_tracing();

    let compiled = compile(mean_graph())?;
    let values = compiled.compute_now([("xs", range(100))], true).await?;

    assert_eq!(values.len(), 3);
    assert_eq!(values["xs"], range(100));
    assert_eq!(values["n"], json!(100));
    assert_eq!(values["m"], json!(49.5));
    Ok(())
}

#[tokio::test]
async fn mean_graph_can_drop_initials() -> TestResult {
    init_tracing();

    let compiled = compile(mean_graph())?;
    let values = compiled.compute_now([("xs", range(100))], false).await?;

    let keys: Vec<&str> = values.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["n", "m"]);
    assert_eq!(values["n"], json!(100));
    assert_eq!(values["m"], json!(49.5));
    Ok(())
}

#[tokio::test]
async fn every_value_is_its_function_of_resolved_dependencies() -> TestResult {
    init_tracing();

    let compiled = GraphBuilder::new()
        .value("a", json!(2.0))
        .func("b", &["a"], |args| Ok(json!(as_f64(&args[0])? * 10.0)))
        .func("c", &["a", "b"], sum)
        .func("d", &["c", "b", "a"], |args| {
            Ok(json!(as_f64(&args[0])? - as_f64(&args[1])? - as_f64(&args[2])?))
        })
        .compile();

    let values = compiled.compute_now(Vec::<(String, Value)>::new(), true).await?;

    assert_eq!(values["a"], json!(2.0));
    assert_eq!(values["b"], json!(20.0));
    assert_eq!(values["c"], json!(22.0));
    assert_eq!(values["d"], json!(0.0));
    Ok(())
}

#[tokio::test]
async fn supplied_values_override_graph_entries() -> TestResult {
    init_tracing();

    let counter = CallCounter::new();
    let compiled = GraphBuilder::new()
        .value("x", json!(1.0))
        .node("y", counter.counted(&["x"], sum))
        .func("z", &["y"], |args| Ok(json!(as_f64(&args[0])? + 1.0)))
        .compile();

    let values = compiled
        .compute_now([("x", json!(5.0)), ("y", json!(100.0))], true)
        .await?;

    assert_eq!(values["x"], json!(5.0));
    assert_eq!(values["y"], json!(100.0));
    assert_eq!(values["z"], json!(101.0));
    assert_eq!(counter.calls(), 0, "overridden node must not be computed");
    Ok(())
}

#[tokio::test]
async fn producers_are_invoked_once_per_run() -> TestResult {
    init_tracing();

    let ticks = Arc::new(AtomicUsize::new(0));
    let source = Arc::clone(&ticks);
    let compiled = GraphBuilder::new()
        .node(
            "tick",
            Node::producer(move || Ok(json!(source.fetch_add(1, Ordering::SeqCst)))),
        )
        .func("double", &["tick"], |args| Ok(json!(as_f64(&args[0])? * 2.0)))
        .compile();

    let first = compiled.compute_now(Vec::<(String, Value)>::new(), true).await?;
    let second = compiled.compute_now(Vec::<(String, Value)>::new(), true).await?;

    assert_eq!(first["tick"], json!(0));
    assert_eq!(second["tick"], json!(1));
    assert_eq!(second["double"], json!(2.0));
    assert_eq!(ticks.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn missing_dependency_names_node_and_key() {
    init_tracing();

    let compiled = compile(mean_graph()).expect("mean graph is valid");
    let result = compiled.compute_now([("ys", range(3))], true).await;

    match result {
        Err(GraphError::MissingDependency {
            node,
            missing,
            available,
        }) => {
            assert_eq!(node, "n");
            assert_eq!(missing, "xs");
            assert_eq!(available, vec!["ys".to_string()]);
        }
        Err(e) => panic!("Expected MissingDependency, got: {:?}", e),
        Ok(v) => panic!("Expected error, got Ok({:?})", v),
    }
}

#[tokio::test]
async fn running_without_any_initial_values_fails_before_computing() {
    init_tracing();

    let counter = CallCounter::new();
    let compiled = GraphBuilder::new()
        .node("n", counter.counted(&["xs"], sum))
        .compile();

    let result = compiled.compute_now(Vec::<(String, Value)>::new(), true).await;

    assert!(matches!(result, Err(GraphError::NoInitialValues)));
    assert!(compiled.compute_later(Vec::<(String, Value)>::new(), true).is_err());
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn node_failure_keeps_original_error() {
    init_tracing();

    let compiled = GraphBuilder::new()
        .func("ratio", &["num", "den"], |args| {
            let den = as_f64(&args[1])?;
            if den == 0.0 {
                bail!("denominator is zero");
            }
            Ok(json!(as_f64(&args[0])? / den))
        })
        .compile();

    let err = compiled
        .compute_now([("num", json!(1.0)), ("den", json!(0.0))], true)
        .await
        .expect_err("division by zero must fail");

    assert_eq!(err.node(), Some("ratio"));
    match err {
        GraphError::NodeFailed { source, .. } => {
            assert_eq!(source.to_string(), "denominator is zero");
        }
        other => panic!("Expected NodeFailed, got: {:?}", other),
    }
}

#[tokio::test]
async fn compiled_graph_is_reusable_across_runs() -> TestResult {
    init_tracing();

    let compiled: CompiledGraph<Value> = compile(mean_graph())?;

    let small = compiled.compute_now([("xs", range(3))], false).await?;
    let large = compiled.compute_now([("xs", range(11))], false).await?;

    assert_eq!(small["m"], json!(1.0));
    assert_eq!(large["m"], json!(5.0));
    assert_eq!(compiled.cached_orders(), 1);
    Ok(())
}
