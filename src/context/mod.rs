//! Ambient device and session context injected into every request.
//!
//! The context is process-wide: identity values are fixed at construction,
//! while the connection-type label can be republished at any time by a
//! connectivity notifier. Publication goes through a `tokio::sync::watch`
//! channel (single writer, many readers); a reader always sees a whole
//! label, and every call that starts after
//! [`AmbientContext::update_connection_type`] returns observes the new value.

mod connection;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use connection::{
    ConnectionType, ConnectivityProbe, FixedProbe, MobileNetwork, UnknownConnectionType,
};

use tokio::sync::watch;

/// Names of the ambient headers.
pub mod header {
    /// Application version.
    pub const APP_VERSION: &str = "X-Viki-app-ver";
    /// Device manufacturer.
    pub const MANUFACTURER: &str = "X-Viki-manufacturer";
    /// Device model.
    pub const DEVICE_MODEL: &str = "X-Viki-device-model";
    /// Operating system version.
    pub const OS_VERSION: &str = "X-Viki-device-os-ver";
    /// Active connection type label.
    pub const CONNECTION_TYPE: &str = "X-Viki-connection-type";
    /// Mobile carrier name.
    pub const CARRIER: &str = "X-Viki-carrier";
    /// Retries performed so far for the request.
    pub const RETRIES: &str = "X-Viki-retries";
    /// Marks test traffic.
    pub const TEST: &str = "X-Viki-test";
}

/// Identity of the app and device, fixed for the adapter's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Application version string
    pub app_version: String,
    /// Device manufacturer
    pub manufacturer: String,
    /// Device model
    pub device_model: String,
    /// Operating system version
    pub os_version: String,
    /// Mobile carrier name, if the device has one
    pub carrier: Option<String>,
    /// Whether the platform can decode WebP images
    pub supports_webp: bool,
}

impl DeviceIdentity {
    /// Creates an identity with the given app version and empty device fields.
    #[must_use]
    pub fn new(app_version: impl Into<String>) -> Self {
        Self {
            app_version: app_version.into(),
            ..Self::default()
        }
    }

    /// Sets manufacturer and model.
    #[must_use]
    pub fn with_device(
        mut self,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        self.manufacturer = manufacturer.into();
        self.device_model = model.into();
        self
    }

    /// Sets the operating system version.
    #[must_use]
    pub fn with_os_version(mut self, os_version: impl Into<String>) -> Self {
        self.os_version = os_version.into();
        self
    }

    /// Sets the carrier name.
    #[must_use]
    pub fn with_carrier(mut self, carrier: impl Into<String>) -> Self {
        self.carrier = Some(carrier.into());
        self
    }

    /// Sets WebP support.
    #[must_use]
    pub const fn with_webp_support(mut self, supports_webp: bool) -> Self {
        self.supports_webp = supports_webp;
        self
    }
}

/// Process-wide ambient values shared by every request.
#[derive(Debug)]
pub struct AmbientContext {
    identity: DeviceIdentity,
    send_test_header: bool,
    connection_type: watch::Sender<Option<String>>,
}

impl AmbientContext {
    /// Creates a context with an initial connection label.
    #[must_use]
    pub fn new(
        identity: DeviceIdentity,
        connection_type: Option<String>,
        send_test_header: bool,
    ) -> Self {
        let (connection_type, _) = watch::channel(connection_type);
        Self {
            identity,
            send_test_header,
            connection_type,
        }
    }

    /// Creates a context whose initial connection label comes from `probe`.
    #[must_use]
    pub fn from_probe(
        identity: DeviceIdentity,
        probe: &impl ConnectivityProbe,
        send_test_header: bool,
    ) -> Self {
        Self::new(identity, probe.current_connection_label(), send_test_header)
    }

    /// The fixed device identity.
    #[must_use]
    pub const fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Whether test traffic is marked.
    #[must_use]
    pub const fn send_test_header(&self) -> bool {
        self.send_test_header
    }

    /// The currently published connection label.
    #[must_use]
    pub fn connection_type(&self) -> Option<String> {
        self.connection_type.borrow().clone()
    }

    /// Publishes a new connection label.
    pub fn update_connection_type(&self, connection_type: Option<String>) {
        let previous = self.connection_type.send_replace(connection_type);
        tracing::debug!(
            previous = previous.as_deref().unwrap_or("none"),
            current = self.connection_type.borrow().as_deref().unwrap_or("none"),
            "Connection type updated"
        );
    }

    /// Re-reads the connection label from `probe` and publishes it.
    pub fn refresh_connection_type(&self, probe: &impl ConnectivityProbe) {
        self.update_connection_type(probe.current_connection_label());
    }

    /// Subscribes to connection label changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.connection_type.subscribe()
    }

    /// Computes the ambient headers for an attempt with `retry_count` retries.
    ///
    /// Headers whose value is unknown (no carrier, no connection) are left
    /// out. The test header is present only when test traffic is marked.
    #[must_use]
    pub fn ambient_headers(&self, retry_count: u32) -> Vec<(&'static str, String)> {
        let identity = &self.identity;
        let mut headers = vec![
            (header::APP_VERSION, identity.app_version.clone()),
            (header::MANUFACTURER, identity.manufacturer.clone()),
            (header::DEVICE_MODEL, identity.device_model.clone()),
            (header::OS_VERSION, identity.os_version.clone()),
        ];

        if let Some(connection) = self.connection_type() {
            headers.push((header::CONNECTION_TYPE, connection));
        }
        if let Some(carrier) = &identity.carrier {
            headers.push((header::CARRIER, carrier.clone()));
        }

        headers.push((header::RETRIES, retry_count.to_string()));

        if self.send_test_header {
            headers.push((header::TEST, true.to_string()));
        }

        headers
    }
}
