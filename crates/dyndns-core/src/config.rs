//! Configuration types for the dynamic DNS updater
//!
//! The configuration is loaded once at startup (by the daemon) and is
//! immutable afterwards. The layout mirrors the TOML file:
//!
//! ```toml
//! [api]
//! token = "..."
//! secret = "..."
//!
//! [config]
//! update_interval = 300
//! pointers = ["home.example.no"]
//! ```

use serde::Deserialize;
use std::fmt;

/// Minimum poll interval, and the fixed delay before every observation (seconds)
pub const LOOP_GUARD_SECS: u64 = 10;

/// Plain-text "what is my IP" service
pub const DEFAULT_LOOKUP_URL: &str = "https://api.ipify.org";

/// Domeneshop API base URL
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.domeneshop.no/v0";

/// Main DDNS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DdnsConfig {
    /// Provider credentials
    pub api: ApiCredentials,

    /// Polling settings and the records to keep updated
    #[serde(rename = "config")]
    pub polling: PollingConfig,

    /// Optional endpoint overrides
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Optional log settings
    #[serde(default)]
    pub log: LogConfig,
}

impl DdnsConfig {
    /// Create a configuration with default endpoints
    pub fn new(api: ApiCredentials, update_interval: u64, pointers: Vec<String>) -> Self {
        Self {
            api,
            polling: PollingConfig {
                update_interval,
                pointers,
            },
            endpoints: EndpointConfig::default(),
            log: LogConfig::default(),
        }
    }

    /// The poll interval after applying the guard floor
    pub fn effective_interval_secs(&self) -> u64 {
        self.polling.update_interval.max(LOOP_GUARD_SECS)
    }

    /// Validate the configuration
    ///
    /// An empty pointer list is accepted; the loop then observes but never updates.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.api.validate()?;

        for pointer in &self.polling.pointers {
            validate_record_name(pointer)?;
        }

        self.endpoints.validate()?;
        self.log.validate()?;

        Ok(())
    }
}

/// API credentials for the DNS provider
///
/// The token is sent as the basic-auth username and the secret as the password.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose either value.
#[derive(Clone, Deserialize)]
pub struct ApiCredentials {
    /// API token
    pub token: String,
    /// API secret
    pub secret: String,
}

impl ApiCredentials {
    /// Create new credentials
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.token.trim().is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }
        if self.secret.trim().is_empty() {
            return Err(crate::Error::config("API secret cannot be empty"));
        }
        Ok(())
    }
}

// Custom Debug implementation that hides the credentials
impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("token", &"<REDACTED>")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// Polling settings
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Requested interval between observations, in seconds
    ///
    /// Values below [`LOOP_GUARD_SECS`] are raised to it.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// DNS names (pointers) to keep updated, in update order
    #[serde(default)]
    pub pointers: Vec<String>,
}

/// IP version accepted from the lookup service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
    /// Whatever the lookup service returns
    #[default]
    Any,
}

impl IpVersion {
    /// Whether the address is acceptable under this filter
    pub fn accepts(&self, ip: &std::net::IpAddr) -> bool {
        match self {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
            IpVersion::Any => true,
        }
    }
}

/// Endpoint and transport settings
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// URL of the plain-text address echo service
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,

    /// Base URL of the provider API (the dyndns path is appended)
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// Timeout for the address lookup request (seconds)
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,

    /// Timeout for each record update request (seconds)
    #[serde(default = "default_update_timeout_secs")]
    pub update_timeout_secs: u64,

    /// Address family to accept from the lookup service
    #[serde(default)]
    pub ip_version: IpVersion,

    /// Log updates instead of sending them
    #[serde(default)]
    pub dry_run: bool,
}

impl EndpointConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        validate_http_url("lookup_url", &self.lookup_url)?;
        validate_http_url("provider_base_url", &self.provider_base_url)?;

        if self.lookup_timeout_secs == 0 {
            return Err(crate::Error::config("lookup_timeout_secs must be > 0"));
        }
        if self.update_timeout_secs == 0 {
            return Err(crate::Error::config("update_timeout_secs must be > 0"));
        }

        Ok(())
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            lookup_url: default_lookup_url(),
            provider_base_url: default_provider_base_url(),
            lookup_timeout_secs: default_lookup_timeout_secs(),
            update_timeout_secs: default_update_timeout_secs(),
            ip_version: IpVersion::default(),
            dry_run: false,
        }
    }
}

/// Log settings
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// One of trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LogConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(crate::Error::config(format!(
                "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                self.level
            ))),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_update_interval() -> u64 {
    300
}

fn default_lookup_url() -> String {
    DEFAULT_LOOKUP_URL.to_string()
}

fn default_provider_base_url() -> String {
    DEFAULT_PROVIDER_BASE_URL.to_string()
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

fn default_update_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn validate_http_url(field: &str, url: &str) -> Result<(), crate::Error> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            field, url
        )));
    }
    Ok(())
}

/// Validate that a string is a valid DNS record name
///
/// Basic RFC 1035 checks: total length, label length, characters, hyphens.
pub fn validate_record_name(name: &str) -> Result<(), crate::Error> {
    if name.is_empty() {
        return Err(crate::Error::config("Record name cannot be empty"));
    }

    if name.len() > 253 {
        return Err(crate::Error::config(format!(
            "Record name too long: {} chars (max 253). Got: {}",
            name.len(),
            name
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Record name has empty label: '{}'",
                name
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Record label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Record label contains invalid characters. Label: '{}'. \
                Valid: ASCII letters, digits and hyphen only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Record label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}
