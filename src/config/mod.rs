// src/config/mod.rs

//! Engine configuration.
//!
//! - [`model`] defines the TOML-backed data model.
//! - [`loader`] reads a config file from disk.
//! - [`validate`] checks the values.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, parse_str};
pub use model::{ConfigFile, EngineConfig, RawConfigFile};
pub use validate::validate_engine_config;
