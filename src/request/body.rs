//! Body rules for the canned request variants.

use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

use crate::adapter::Header;

use super::{EncodingError, ParseError};

/// Charset used to decode text responses that do not declare one.
const DEFAULT_TEXT_CHARSET: &str = "ISO-8859-1";

/// Charset used to decode JSON responses that do not declare one.
const DEFAULT_JSON_CHARSET: &str = "utf-8";

/// Content type of both JSON-flavoured variants.
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A request body kind: its content type, encoding and response parsing.
pub trait RequestBody: Send + Sync {
    /// Content type declared for requests carrying this body kind.
    const CONTENT_TYPE: &'static str;

    /// Type produced when parsing a response for this kind of request.
    type Output;

    /// Encodes the body into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if the body cannot be serialized.
    fn encode(&self) -> Result<Vec<u8>, EncodingError>;

    /// Parses response bytes, using `headers` to pick a charset.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the bytes do not form a valid response.
    fn parse(data: &[u8], headers: &[Header]) -> Result<Self::Output, ParseError>;
}

/// Arbitrary string body.
///
/// Declares `application/json; charset=utf-8` whatever the string holds;
/// existing servers rely on that content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBody(pub String);

impl RequestBody for TextBody {
    const CONTENT_TYPE: &'static str = JSON_CONTENT_TYPE;

    type Output = String;

    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        Ok(self.0.as_bytes().to_vec())
    }

    fn parse(data: &[u8], headers: &[Header]) -> Result<String, ParseError> {
        Ok(decode(data, headers, DEFAULT_TEXT_CHARSET))
    }
}

impl From<String> for TextBody {
    fn from(body: String) -> Self {
        Self(body)
    }
}

impl From<&str> for TextBody {
    fn from(body: &str) -> Self {
        Self(body.to_string())
    }
}

/// Pre-encoded `application/x-www-form-urlencoded` body.
///
/// The string is sent as-is; producing a correctly encoded form string
/// is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormBody(pub String);

impl RequestBody for FormBody {
    const CONTENT_TYPE: &'static str = "application/x-www-form-urlencoded";

    type Output = String;

    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        Ok(self.0.as_bytes().to_vec())
    }

    fn parse(data: &[u8], headers: &[Header]) -> Result<String, ParseError> {
        Ok(decode(data, headers, DEFAULT_TEXT_CHARSET))
    }
}

impl From<String> for FormBody {
    fn from(body: String) -> Self {
        Self(body)
    }
}

impl From<&str> for FormBody {
    fn from(body: &str) -> Self {
        Self(body.to_string())
    }
}

/// JSON body serialized with `serde_json`.
///
/// Responses are parsed into a [`serde_json::Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBody<T = serde_json::Value>(pub T);

impl<T> RequestBody for JsonBody<T>
where
    T: Serialize + Send + Sync,
{
    const CONTENT_TYPE: &'static str = JSON_CONTENT_TYPE;

    type Output = serde_json::Value;

    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        Ok(serde_json::to_vec(&self.0)?)
    }

    fn parse(data: &[u8], headers: &[Header]) -> Result<serde_json::Value, ParseError> {
        let text = decode(data, headers, DEFAULT_JSON_CHARSET);
        Ok(serde_json::from_str(&text)?)
    }
}

impl<T> From<T> for JsonBody<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

/// Returns the charset declared in the `Content-Type` header, or `default`.
///
/// Header names and the `charset` parameter name are matched
/// case-insensitively, as RFC 9110 defines both; the first `Content-Type`
/// entry wins.
#[must_use]
pub fn parse_charset(headers: &[Header], default: &str) -> String {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("content-type"))
        .and_then(|h| {
            h.value.split(';').skip(1).find_map(|param| {
                let (name, value) = param.split_once('=')?;
                name.trim()
                    .eq_ignore_ascii_case("charset")
                    .then(|| value.trim().trim_matches('"').to_string())
            })
        })
        .unwrap_or_else(|| default.to_string())
}

/// Decodes bytes with the charset declared in `headers`.
///
/// Labels are resolved the WHATWG way, so `ISO-8859-1` decodes as
/// windows-1252. An unknown label falls back to `default`. A byte order
/// mark is stripped only when it matches the resolved encoding.
fn decode(data: &[u8], headers: &[Header], default: &str) -> String {
    let charset = parse_charset(headers, default);
    let encoding = Encoding::for_label(charset.as_bytes())
        .or_else(|| Encoding::for_label(default.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, malformed) = encoding.decode_with_bom_removal(data);
    if malformed {
        tracing::debug!(charset = encoding.name(), "Response contained malformed sequences");
    }
    text.into_owned()
}
