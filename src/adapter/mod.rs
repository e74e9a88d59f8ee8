//! Adaptation of abstract requests onto a concrete transport.
//!
//! This module provides:
//! - The request adapter ([`RequestAdapter`]) that merges headers, resolves
//!   URLs, picks a body strategy and normalizes responses
//! - The normalized response shape ([`NormalizedResponse`], [`Header`])
//! - Adapter errors ([`AdapterError`]) and retry classification ([`IsRetryable`])
//!
//! # Header precedence
//!
//! Outgoing headers are merged in three layers, later layers winning on a
//! case-insensitive name collision:
//!
//! 1. **Request headers** - owned by the request itself
//! 2. **Extra headers** - supplied by the caller for this call only
//! 3. **Ambient headers** - device, connection and retry-count headers
//!
//! Ambient headers are computed fresh on every call and always win, so a
//! stale or spoofed attempt count can never reach the server. The image-host
//! `Accept` override and the body `Content-Type` are applied after the merge.

mod error;
mod headers;
mod query;
mod response;
mod stack;

#[cfg(test)]
mod stack_tests;

pub use error::{AdapterError, IsRetryable};
pub use headers::{DEFAULT_IMAGE_HOST_PATTERN, image_accept_value};
pub use query::resolve_url;
pub use response::{Header, NormalizedResponse, ResponseBody, has_response_body};
pub use stack::RequestAdapter;
