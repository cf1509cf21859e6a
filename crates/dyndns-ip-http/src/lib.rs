// # HTTP Address Observer
//
// This crate provides an AddressObserver that asks a plain-text echo service
// (e.g. api.ipify.org) for the caller's public address.
//
// ## Behavior
//
// - One GET per `observe()` call; nothing is cached between calls
// - The trimmed response body is parsed as the address
// - Non-success status, transport failure or timeout → `Error::Network`/`Error::Status`
// - Unparseable body or wrong IP version → `Error::InvalidInput`
// - No retries; the polling loop simply tries again next cycle

use dyndns_core::config::{EndpointConfig, IpVersion};
use dyndns_core::traits::AddressObserver;
use dyndns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default timeout for the lookup request
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public address observer
#[derive(Debug, Clone)]
pub struct HttpAddressObserver {
    /// URL to fetch the address from
    url: String,

    /// Address family to accept
    version: IpVersion,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpAddressObserver {
    /// Create a new HTTP address observer
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the address from (e.g., "https://api.ipify.org")
    /// - `version`: Address family to accept
    pub fn new(url: impl Into<String>, version: IpVersion) -> Result<Self> {
        Self::with_timeout(url, version, DEFAULT_LOOKUP_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, version: IpVersion, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            version,
            client,
        })
    }

    /// Create from the endpoint section of the configuration
    pub fn from_config(endpoints: &EndpointConfig) -> Result<Self> {
        Self::with_timeout(
            endpoints.lookup_url.clone(),
            endpoints.ip_version,
            Duration::from_secs(endpoints.lookup_timeout_secs),
        )
    }

    /// The lookup URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl AddressObserver for HttpAddressObserver {
    async fn observe(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching public address from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("Request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::status(status.as_u16(), body));
        }

        let ip_text = body.trim();

        let ip: IpAddr = ip_text
            .parse()
            .map_err(|_| Error::invalid_input(format!("Invalid IP address: {:?}", ip_text)))?;

        if !self.version.accepts(&ip) {
            return Err(Error::invalid_input(format!(
                "Expected {:?} address, got: {}",
                self.version, ip
            )));
        }

        Ok(ip)
    }

    fn observer_name(&self) -> &'static str {
        "http"
    }
}
