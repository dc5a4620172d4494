// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use serde_json::json;
use tempfile::NamedTempFile;

use depgraph::CompiledGraph;
use depgraph::config::{EngineConfig, load_and_validate, parse_str};
use depgraph::errors::GraphError;
use depgraph_test_utils::builders::{GraphBuilder, sum};

#[test]
fn engine_section_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[engine]
max_parallel = 3
task_timeout_ms = 1500
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).expect("valid config");

    assert_eq!(cfg.engine.max_parallel, Some(3));
    assert_eq!(cfg.engine.task_timeout(), Some(Duration::from_millis(1500)));
    assert_eq!(cfg.engine.worker_pool().limit(), Some(3));
}

#[test]
fn empty_file_uses_defaults() {
    let file = NamedTempFile::new().unwrap();
    let cfg = load_and_validate(file.path()).expect("empty config is valid");
    assert_eq!(cfg.engine, EngineConfig::default());
    assert_eq!(cfg.engine.worker_pool().limit(), None);
}

#[test]
fn zero_parallelism_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[engine]\nmax_parallel = 0\n").unwrap();

    match load_and_validate(file.path()) {
        Err(GraphError::ConfigError(msg)) => assert!(msg.contains("max_parallel")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_engine_keys_are_rejected() {
    let result = parse_str("[engine]\nmax_paralel = 2\n");
    assert!(matches!(result, Err(GraphError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/Depgraph.toml");
    assert!(matches!(result, Err(GraphError::IoError(_))));
}

#[test]
fn with_config_validates_programmatic_settings() {
    let graph = GraphBuilder::new()
        .value("x", json!(1.0))
        .func("y", &["x"], sum)
        .build();
    let config = EngineConfig {
        max_parallel: None,
        task_timeout_ms: Some(0),
    };

    let result = CompiledGraph::with_config(graph, &config);
    assert!(matches!(result, Err(GraphError::ConfigError(_))));
}
