// src/config/validate.rs

use crate::config::model::{ConfigFile, EngineConfig, RawConfigFile};
use crate::errors::{GraphError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = GraphError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_engine_config(&raw.engine)?;
        Ok(ConfigFile::new_unchecked(raw.engine))
    }
}

/// Reject settings that would make the engine unusable.
pub fn validate_engine_config(cfg: &EngineConfig) -> Result<()> {
    if cfg.max_parallel == Some(0) {
        return Err(GraphError::ConfigError(
            "[engine].max_parallel must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.task_timeout_ms == Some(0) {
        return Err(GraphError::ConfigError(
            "[engine].task_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}
