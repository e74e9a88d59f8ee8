//! Configuration layer for volley-stack.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! The request URL has no default and must come from the CLI or the file.
//!
//! Headers and params are merged: file entries first, CLI entries override
//! entries with the same name.
//!
//! # Boolean Flag Semantics
//!
//! Boolean flags (`--webp`, `--test-header`) use OR semantics: if set in
//! either CLI or TOML, the result is `true`.
//!
//! # TOML-Only Options
//!
//! - `retry.backoff_multiplier` (default: 1.0)
//! - `adapter.image_host_pattern` (default: [`DEFAULT_IMAGE_HOST_PATTERN`])
//! - `device.manufacturer`, `device.model`, `device.os_version`
//!
//! [`DEFAULT_IMAGE_HOST_PATTERN`]: crate::adapter::DEFAULT_IMAGE_HOST_PATTERN

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{BodyKind, Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{BodyConfig, ValidatedConfig, write_default_config};
