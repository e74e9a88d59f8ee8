//! URL resolution for query-carrying methods.

use url::form_urlencoded::byte_serialize;

use crate::request::{Method, Params};

/// Appends `params` to `url` as a query string when `method` carries them.
///
/// Keys and values are form-encoded as UTF-8 (space becomes `+`), a null
/// value is sent as the literal `null`, and pairs are joined with `&` in
/// insertion order. The block is attached with `?` when the URL has no
/// query yet and with `&` otherwise. The existing URL text is left
/// untouched, so an already-encoded URL is never encoded twice.
///
/// Methods outside the query-carrying set, and empty params, return the
/// URL unchanged.
#[must_use]
pub fn resolve_url(method: Method, url: &str, params: &Params) -> String {
    if !method.carries_query_params() || params.is_empty() {
        return url.to_string();
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value.unwrap_or("null"))))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

fn encode(text: &str) -> String {
    byte_serialize(text.as_bytes()).collect()
}
