//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use crate::request::RetrySettings;

/// Default request method.
pub const METHOD: &str = "GET";

/// Default application version sent in the ambient headers.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default initial timeout in milliseconds.
pub const RETRY_INITIAL_TIMEOUT_MS: u64 = 2500;

/// Default maximum number of retries.
pub const RETRY_MAX_RETRIES: u32 = RetrySettings::DEFAULT_MAX_RETRIES;

/// Default retry backoff multiplier.
pub const RETRY_BACKOFF_MULTIPLIER: f64 = RetrySettings::DEFAULT_BACKOFF_MULTIPLIER;

