//! Connection type labels and the probe that reports them.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Cellular network technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MobileNetwork {
    OneXRtt,
    Cdma,
    Edge,
    EvdoRev0,
    EvdoRevA,
    EvdoRevB,
    Gprs,
    Hsdpa,
    Hspa,
    Hsupa,
    Umts,
    Ehrpd,
    Hspap,
    Iden,
    Lte,
    Unknown,
}

impl MobileNetwork {
    /// Every technology, in label order.
    pub const ALL: [Self; 16] = [
        Self::OneXRtt,
        Self::Cdma,
        Self::Edge,
        Self::EvdoRev0,
        Self::EvdoRevA,
        Self::EvdoRevB,
        Self::Gprs,
        Self::Hsdpa,
        Self::Hspa,
        Self::Hsupa,
        Self::Umts,
        Self::Ehrpd,
        Self::Hspap,
        Self::Iden,
        Self::Lte,
        Self::Unknown,
    ];

    /// Label sent in the connection-type header.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneXRtt => "1xRTT",
            Self::Cdma => "CDMA",
            Self::Edge => "EDGE",
            Self::EvdoRev0 => "EVDO_0",
            Self::EvdoRevA => "EVDO_A",
            Self::EvdoRevB => "EVDO_B",
            Self::Gprs => "GPRS",
            Self::Hsdpa => "HSDPA",
            Self::Hspa => "HSPA",
            Self::Hsupa => "HSUPA",
            Self::Umts => "UMTS",
            Self::Ehrpd => "EHRPD",
            Self::Hspap => "HSPAP",
            Self::Iden => "IDEN",
            Self::Lte => "LTE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Kind of the active network connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    /// Wi-Fi
    Wifi,
    /// Cellular data over the given technology
    Mobile(MobileNetwork),
}

impl ConnectionType {
    /// Label sent in the connection-type header.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Wifi => "WIFI",
            Self::Mobile(network) => network.label(),
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a connection label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown connection type '{0}'")]
pub struct UnknownConnectionType(pub String);

impl FromStr for ConnectionType {
    type Err = UnknownConnectionType;

    /// Parses a label case-insensitively (`wifi`, `lte`, `1xrtt`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(Self::Wifi.label()) {
            return Ok(Self::Wifi);
        }
        MobileNetwork::ALL
            .into_iter()
            .find(|network| network.label().eq_ignore_ascii_case(s))
            .map(Self::Mobile)
            .ok_or_else(|| UnknownConnectionType(s.to_string()))
    }
}

/// Source of the current connection type.
///
/// Consulted when the ambient context is built and whenever the host
/// reports a connectivity change.
pub trait ConnectivityProbe: Send + Sync {
    /// The active connection, or `None` when there is no network.
    fn current_connection(&self) -> Option<ConnectionType>;

    /// Label of the active connection, or `None` when there is no network.
    fn current_connection_label(&self) -> Option<String> {
        self.current_connection().map(|c| c.label().to_string())
    }
}

/// Probe that always reports the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedProbe(pub Option<ConnectionType>);

impl ConnectivityProbe for FixedProbe {
    fn current_connection(&self) -> Option<ConnectionType> {
        self.0
    }
}
