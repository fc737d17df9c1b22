//! Launchkey Core - configuration and error handling for launchkey
//!
//! This crate holds the pieces shared by the CLI: the `launchkey.toml` /
//! `launchkey.yaml` configuration file, its discovery and validation, and
//! the top-level error types.

pub mod config;
pub mod error;

pub use config::{load_config, load_config_or_default, Config, SigningSettings};
pub use error::{ConfigError, LaunchkeyError, Result};
