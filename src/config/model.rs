// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::exec::{ExecOptions, WorkerPool};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [engine]
/// max_parallel = 4
/// task_timeout_ms = 2000
/// ```
///
/// Every section and field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub engine: EngineConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(engine: EngineConfig) -> Self {
        Self { engine }
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of parallel nodes running at once.
    ///
    /// Absent means unbounded.
    #[serde(default)]
    pub max_parallel: Option<usize>,

    /// Default deadline for parallel nodes, in milliseconds.
    ///
    /// A node's own `with_timeout` takes precedence.
    #[serde(default)]
    pub task_timeout_ms: Option<u64>,
}

impl EngineConfig {
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_ms.map(Duration::from_millis)
    }

    pub fn worker_pool(&self) -> WorkerPool {
        match self.max_parallel {
            Some(limit) => WorkerPool::bounded(limit),
            None => WorkerPool::unbounded(),
        }
    }

    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            pool: self.worker_pool(),
            default_timeout: self.task_timeout(),
        }
    }
}
