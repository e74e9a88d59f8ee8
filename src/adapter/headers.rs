//! Outgoing header construction.

use http::header::{HeaderMap, HeaderName, HeaderValue};

use super::AdapterError;

/// Pattern matching image CDN hosts such as `0.viki.io` or `12.viki.io`.
pub const DEFAULT_IMAGE_HOST_PATTERN: &str = r"\d+\.viki\.io";

/// `Accept` value sent to image hosts.
#[must_use]
pub const fn image_accept_value(supports_webp: bool) -> &'static str {
    if supports_webp {
        "image/webp;image/jpg;image/png"
    } else {
        "image/jpg;image/png"
    }
}

/// Inserts every pair into `headers`, replacing existing values.
///
/// Names are compared case-insensitively, so a later `accept` replaces an
/// earlier `Accept`.
pub(super) fn merge_headers<I, K, V>(headers: &mut HeaderMap, pairs: I) -> Result<(), AdapterError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (name, value) in pairs {
        let name = name.as_ref();
        headers.insert(header_name(name)?, header_value(name, value.as_ref())?);
    }
    Ok(())
}

pub(super) fn header_name(name: &str) -> Result<HeaderName, AdapterError> {
    name.parse::<HeaderName>()
        .map_err(|e| AdapterError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

pub(super) fn header_value(name: &str, value: &str) -> Result<HeaderValue, AdapterError> {
    HeaderValue::from_str(value).map_err(|e| AdapterError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
