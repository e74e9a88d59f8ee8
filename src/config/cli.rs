//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// volley-stack: send one canned request through the request adapter
///
/// Builds a string, JSON or form request, decorates it with the ambient
/// device headers and sends it, retrying transient failures.
#[derive(Debug, Parser)]
#[command(name = "volley-stack")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Request URL (required unless set in the config file)
    #[arg(long)]
    pub url: Option<String>,

    /// Request method (GET, POST, PUT, DELETE, HEAD, PATCH, GET_OR_POST)
    #[arg(long, short = 'X')]
    pub method: Option<String>,

    /// Request headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", short = 'H', value_name = "K=V")]
    pub headers: Vec<String>,

    /// Request params in 'Key=Value' format; a bare 'Key' sends a null value
    #[arg(long = "param", short = 'p', value_name = "K=V")]
    pub params: Vec<String>,

    /// Request body
    #[arg(long, short = 'd')]
    pub body: Option<String>,

    /// How the body is encoded and the response parsed
    #[arg(long = "body-kind", value_enum)]
    pub body_kind: Option<BodyKind>,

    /// Application version sent in the ambient headers
    #[arg(long = "app-version")]
    pub app_version: Option<String>,

    /// Mobile carrier name sent in the ambient headers
    #[arg(long)]
    pub carrier: Option<String>,

    /// Connection type label (WIFI, LTE, HSPA, ...)
    #[arg(long = "connection-type")]
    pub connection_type: Option<String>,

    /// Advertise WebP support to image hosts
    #[arg(long)]
    pub webp: bool,

    /// Mark the request as test traffic
    #[arg(long = "test-header")]
    pub test_header: bool,

    /// Maximum number of retries after the first attempt
    #[arg(long = "retry-max")]
    pub retry_max: Option<u32>,

    /// Timeout of the first attempt in milliseconds
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Print the response status line and headers
    #[arg(long = "include-headers", short = 'i')]
    pub include_headers: bool,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for volley-stack
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "volley-stack.toml")]
        output: PathBuf,
    },
}

/// Request body kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BodyKind {
    /// Plain string body, text response
    #[default]
    #[value(name = "text")]
    Text,
    /// JSON body, JSON response
    #[value(name = "json")]
    Json,
    /// Pre-encoded form body, text response
    #[value(name = "form")]
    Form,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Form => "form",
        })
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
