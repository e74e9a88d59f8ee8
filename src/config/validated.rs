//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use regex::Regex;
use url::Url;

use crate::adapter::DEFAULT_IMAGE_HOST_PATTERN;
use crate::context::{ConnectionType, DeviceIdentity};
use crate::request::{Method, Params, RetrySettings};

use super::cli::{BodyKind, Cli};
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Request body, already checked against its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyConfig {
    /// String body
    Text(Option<String>),
    /// JSON body, parsed
    Json(Option<serde_json::Value>),
    /// Pre-encoded form body
    Form(Option<String>),
}

impl BodyConfig {
    /// The kind of this body.
    #[must_use]
    pub const fn kind(&self) -> BodyKind {
        match self {
            Self::Text(_) => BodyKind::Text,
            Self::Json(_) => BodyKind::Json,
            Self::Form(_) => BodyKind::Form,
        }
    }

    /// Returns true if a body is present.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        match self {
            Self::Text(body) | Self::Form(body) => body.is_some(),
            Self::Json(body) => body.is_some(),
        }
    }
}

/// Fully validated configuration ready for use by the application.
///
/// This struct represents a complete, validated configuration where all
/// required fields are present and all values have been validated.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Request URL, as given (validated to parse)
    pub url: String,

    /// Request method
    pub method: Method,

    /// Request headers, names and values validated
    pub headers: HashMap<String, String>,

    /// Request params, in the order given
    pub params: Params,

    /// Request body
    pub body: BodyConfig,

    /// Device identity for the ambient headers
    pub identity: DeviceIdentity,

    /// Initial connection type, `None` when unknown
    pub connection_type: Option<ConnectionType>,

    /// Whether requests are marked as test traffic
    pub send_test_header: bool,

    /// Pattern identifying image hosts
    pub image_host_pattern: Regex,

    /// Retry settings for the request
    pub retry: RetrySettings,

    /// Print the response status line and headers
    pub include_headers: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connection = self
            .connection_type
            .map_or_else(|| "none".to_string(), |c| c.to_string());

        write!(
            f,
            "Config {{ url: {}, method: {}, body: {}{}, headers: {}, params: {}, \
             app_version: {}, connection: {}, retry: {}x/{}ms }}",
            self.url,
            self.method,
            self.body.kind(),
            if self.body.is_present() { "" } else { " (empty)" },
            self.headers.len(),
            self.params.len(),
            self.identity.app_version,
            connection,
            self.retry.max_retries,
            self.retry.initial_timeout.as_millis(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is missing or invalid
    /// - The method, body kind or connection type is unknown
    /// - A header or param is malformed
    /// - A JSON body is not valid JSON
    /// - The image host pattern is not a valid regex
    /// - Retry settings are out of range
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let url = Self::resolve_url(cli, toml)?;
        let method = Self::resolve_method(cli, toml)?;
        let headers = Self::resolve_headers(cli, toml)?;
        let params = Self::resolve_params(cli, toml)?;
        let body = Self::resolve_body(cli, toml)?;
        let identity = Self::resolve_identity(cli, toml);
        let connection_type = Self::resolve_connection_type(cli, toml)?;
        let image_host_pattern = Self::resolve_image_host_pattern(toml)?;
        let retry = Self::build_retry_settings(cli, toml)?;

        // Flags only enable
        let send_test_header = cli.test_header || toml.is_some_and(|t| t.network.test_header);

        Ok(Self {
            url,
            method,
            headers,
            params,
            body,
            identity,
            connection_type,
            send_test_header,
            image_host_pattern,
            retry,
            include_headers: cli.include_headers,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        // CLI takes precedence
        let url_str = cli
            .url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.request.url.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(field::URL, "Use --url or set request.url in config file")
            })?;

        Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        // Kept verbatim: the URL text is part of the cache key
        Ok(url_str.to_string())
    }

    fn resolve_method(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Method, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let method_str = cli
            .method
            .as_deref()
            .or_else(|| toml.and_then(|t| t.request.method.as_deref()))
            .unwrap_or(defaults::METHOD);

        Ok(method_str.parse::<Method>()?)
    }

    fn resolve_headers(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<HashMap<String, String>, ConfigError> {
        let mut headers = HashMap::new();

        // Add TOML headers first (CLI can override)
        if let Some(toml) = toml {
            for (name, value) in &toml.request.headers {
                validate_header(name, value)?;
                headers.insert(name.clone(), value.clone());
            }
        }

        // Add CLI headers (override TOML)
        for header_str in &cli.headers {
            let (name, value) = parse_header_string(header_str)?;
            validate_header(&name, &value)?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    fn resolve_params(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Params, ConfigError> {
        let mut params = Params::new();

        if let Some(toml) = toml {
            params.extend(toml.request.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        for param_str in &cli.params {
            match parse_param_string(param_str)? {
                (key, Some(value)) => params.insert(key, value),
                (key, None) => params.insert_null(key),
            }
        }

        Ok(params)
    }

    fn resolve_body(cli: &Cli, toml: Option<&TomlConfig>) -> Result<BodyConfig, ConfigError> {
        let kind = match cli.body_kind {
            Some(kind) => kind,
            None => toml
                .and_then(|t| t.request.body_kind.as_deref())
                .map(parse_body_kind)
                .transpose()?
                .unwrap_or_default(),
        };

        let body = cli
            .body
            .clone()
            .or_else(|| toml.and_then(|t| t.request.body.clone()));

        Ok(match kind {
            BodyKind::Text => BodyConfig::Text(body),
            BodyKind::Form => BodyConfig::Form(body),
            BodyKind::Json => BodyConfig::Json(
                body.map(|text| serde_json::from_str(&text))
                    .transpose()
                    .map_err(|e| ConfigError::InvalidBody {
                        kind: "json",
                        reason: e.to_string(),
                    })?,
            ),
        })
    }

    fn resolve_identity(cli: &Cli, toml: Option<&TomlConfig>) -> DeviceIdentity {
        let device = toml.map(|t| &t.device);
        let text = |value: Option<&Option<String>>| {
            value.and_then(Option::as_deref).unwrap_or_default().to_string()
        };

        let app_version = cli
            .app_version
            .as_deref()
            .or_else(|| device.and_then(|d| d.app_version.as_deref()))
            .unwrap_or(defaults::APP_VERSION);

        let mut identity = DeviceIdentity::new(app_version)
            .with_device(
                text(device.map(|d| &d.manufacturer)),
                text(device.map(|d| &d.model)),
            )
            .with_os_version(text(device.map(|d| &d.os_version)))
            .with_webp_support(cli.webp || device.is_some_and(|d| d.webp));

        let carrier = cli
            .carrier
            .as_deref()
            .or_else(|| device.and_then(|d| d.carrier.as_deref()));
        if let Some(carrier) = carrier {
            identity = identity.with_carrier(carrier);
        }

        identity
    }

    fn resolve_connection_type(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<ConnectionType>, ConfigError> {
        let label = cli
            .connection_type
            .as_deref()
            .or_else(|| toml.and_then(|t| t.network.connection_type.as_deref()));

        Ok(label.map(str::parse::<ConnectionType>).transpose()?)
    }

    fn resolve_image_host_pattern(toml: Option<&TomlConfig>) -> Result<Regex, ConfigError> {
        let pattern = toml
            .and_then(|t| t.adapter.image_host_pattern.as_deref())
            .unwrap_or(DEFAULT_IMAGE_HOST_PATTERN);

        Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })
    }

    fn build_retry_settings(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetrySettings, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let max_retries = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_retries))
            .unwrap_or(defaults::RETRY_MAX_RETRIES);

        let initial_timeout_ms = cli
            .timeout_ms
            .or_else(|| retry.and_then(|r| r.initial_timeout_ms))
            .unwrap_or(defaults::RETRY_INITIAL_TIMEOUT_MS);

        let multiplier = retry
            .and_then(|r| r.backoff_multiplier)
            .unwrap_or(defaults::RETRY_BACKOFF_MULTIPLIER);

        if initial_timeout_ms == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "initial_timeout_ms",
                reason: "must be greater than 0".to_string(),
            });
        }

        if multiplier < 0.0 || !multiplier.is_finite() {
            return Err(ConfigError::InvalidRetry(
                "backoff_multiplier must be a non-negative finite number".to_string(),
            ));
        }

        Ok(RetrySettings::new()
            .with_initial_timeout(Duration::from_millis(initial_timeout_ms))
            .with_max_retries(max_retries)
            .with_backoff_multiplier(multiplier))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn parse_body_kind(s: &str) -> Result<BodyKind, ConfigError> {
    match s.to_lowercase().as_str() {
        "text" | "string" => Ok(BodyKind::Text),
        "json" => Ok(BodyKind::Json),
        "form" | "x-www-form-urlencoded" => Ok(BodyKind::Form),
        _ => Err(ConfigError::InvalidBodyKind {
            value: s.to_string(),
        }),
    }
}

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // The first delimiter wins, so "Key: a=b" and "Key=a:b" both keep their values.
    let (name, value) = s
        .find(['=', ':'])
        .map(|at| (&s[..at], &s[at + 1..]))
        .ok_or_else(|| ConfigError::InvalidHeader {
            value: s.to_string(),
        })?;

    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_param_string(s: &str) -> Result<(String, Option<String>), ConfigError> {
    let (key, value) = match s.split_once('=') {
        Some((key, value)) => (key, Some(value.to_string())),
        None => (s, None),
    };

    if key.is_empty() {
        return Err(ConfigError::InvalidParam {
            value: s.to_string(),
        });
    }

    Ok((key.to_string(), value))
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}
