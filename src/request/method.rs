//! Request methods understood by the adapter.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The request method of an abstract [`Request`](super::Request).
///
/// Besides the standard verbs this carries the legacy `DeprecatedGetOrPost`
/// variant, which resolves to POST when the request has a body and GET
/// otherwise. `Options` and `Trace` exist in the method set but the adapter
/// refuses to send them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Legacy method: POST if a body is present, GET otherwise
    DeprecatedGetOrPost,
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Trace,
    Patch,
}

/// Error returned when a method code or name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown request method '{0}'")]
pub struct UnknownMethod(pub String);

impl Method {
    /// Every method, in code order.
    pub const ALL: [Self; 9] = [
        Self::DeprecatedGetOrPost,
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Trace,
        Self::Patch,
    ];

    /// Maps a legacy integer method code to a method.
    ///
    /// Codes: -1 legacy GET-or-POST, 0 GET, 1 POST, 2 PUT, 3 DELETE,
    /// 4 HEAD, 5 OPTIONS, 6 TRACE, 7 PATCH.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMethod`] for any other code.
    pub fn from_code(code: i32) -> Result<Self, UnknownMethod> {
        match code {
            -1 => Ok(Self::DeprecatedGetOrPost),
            0 => Ok(Self::Get),
            1 => Ok(Self::Post),
            2 => Ok(Self::Put),
            3 => Ok(Self::Delete),
            4 => Ok(Self::Head),
            5 => Ok(Self::Options),
            6 => Ok(Self::Trace),
            7 => Ok(Self::Patch),
            other => Err(UnknownMethod(other.to_string())),
        }
    }

    /// Returns the legacy integer code for this method.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::DeprecatedGetOrPost => -1,
            Self::Get => 0,
            Self::Post => 1,
            Self::Put => 2,
            Self::Delete => 3,
            Self::Head => 4,
            Self::Options => 5,
            Self::Trace => 6,
            Self::Patch => 7,
        }
    }

    /// Returns true if params are appended to the URL as a query string.
    #[must_use]
    pub const fn carries_query_params(self) -> bool {
        matches!(
            self,
            Self::DeprecatedGetOrPost | Self::Get | Self::Delete | Self::Put | Self::Head
        )
    }

    /// Returns the canonical name of this method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeprecatedGetOrPost => "GET_OR_POST",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = UnknownMethod;

    /// Parses a method name case-insensitively.
    ///
    /// The legacy method is accepted as `GET_OR_POST` or `GET-OR-POST`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == upper)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}
