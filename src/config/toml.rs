//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Request configuration section
    #[serde(default)]
    pub request: RequestSection,

    /// Device identity section
    #[serde(default)]
    pub device: DeviceSection,

    /// Network state section
    #[serde(default)]
    pub network: NetworkSection,

    /// Adapter tuning section
    #[serde(default)]
    pub adapter: AdapterSection,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetrySection,
}

/// Request configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSection {
    /// Request URL
    pub url: Option<String>,

    /// Request method (default: GET)
    pub method: Option<String>,

    /// Body kind: "text", "json" or "form" (default: text)
    pub body_kind: Option<String>,

    /// Request body
    pub body: Option<String>,

    /// Request headers as key-value pairs
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request params as key-value pairs, sent in key order
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Device identity section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceSection {
    /// Application version
    pub app_version: Option<String>,

    /// Device manufacturer
    pub manufacturer: Option<String>,

    /// Device model
    pub model: Option<String>,

    /// Operating system version
    pub os_version: Option<String>,

    /// Mobile carrier name
    pub carrier: Option<String>,

    /// Whether the device decodes WebP images
    #[serde(default)]
    pub webp: bool,
}

/// Network state section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSection {
    /// Connection type label
    pub connection_type: Option<String>,

    /// Mark requests as test traffic
    #[serde(default)]
    pub test_header: bool,
}

/// Adapter tuning section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterSection {
    /// Regex identifying image hosts
    pub image_host_pattern: Option<String>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Timeout of the first attempt in milliseconds
    pub initial_timeout_ms: Option<u64>,

    /// Maximum number of retries after the first attempt
    pub max_retries: Option<u32>,

    /// Fraction of the timeout added on each retry
    pub backoff_multiplier: Option<f64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# volley-stack Configuration File

[request]
# Request URL (required)
# url = "https://api.example.com/v4/videos.json"

# Request method (default: GET)
# Accepted values: GET, POST, PUT, DELETE, HEAD, PATCH, GET_OR_POST
# method = "GET"

# Body kind: "text", "json" or "form" (default: text)
# body_kind = "json"

# Request body
# body = '{"rating": 5}'

# Request headers
# [request.headers]
# X-Custom-Header = "value"

# Request params (query string for GET, DELETE, PUT, HEAD)
# [request.params]
# page = "1"

[device]
# Application version sent as X-Viki-app-ver
# app_version = "1.0.0"
# manufacturer = "Acme"
# model = "Phone 7"
# os_version = "14"
# carrier = "Telco"

# Advertise WebP support to image hosts
# webp = false

[network]
# Connection type label: WIFI, LTE, HSPA, EDGE, ... (omitted when unset)
# connection_type = "WIFI"

# Mark requests as test traffic
# test_header = false

[adapter]
# Regex identifying image hosts that get an image Accept header
# image_host_pattern = '\d+\.viki\.io'

[retry]
# Timeout of the first attempt in milliseconds (default: 2500)
# initial_timeout_ms = 2500

# Maximum number of retries after the first attempt (default: 1)
# max_retries = 1

# Fraction of the timeout added on each retry (default: 1.0)
# backoff_multiplier = 1.0
"#
    .to_string()
}
