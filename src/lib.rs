//! volley-stack: HTTP request adaptation layer
//!
//! A library that turns abstract, queue-managed requests into concrete HTTP
//! calls: it resolves query strings, merges request, caller and ambient
//! device headers, picks the body strategy per method and normalizes the
//! transport's response. A family of canned requests (string, JSON and form
//! bodies) is built on top of it.

pub mod adapter;
pub mod config;
pub mod context;
pub mod request;
pub mod transport;
