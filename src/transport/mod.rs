//! Transport layer that executes concrete HTTP calls.
//!
//! This module provides types and traits for:
//! - Wire-level HTTP requests ([`HttpRequest`])
//! - Raw transport responses with lazily read bodies ([`TransportResponse`], [`BodyStream`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])

mod client;
mod error;
mod http;


pub use client::ReqwestClient;
pub use error::HttpError;
pub use http::{BodyStream, HttpClient, HttpRequest, RawHeader, TransportResponse};
