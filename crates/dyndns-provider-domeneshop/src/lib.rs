// # Domeneshop Record Updater
//
// This crate provides a RecordUpdater for the Domeneshop dynamic DNS API.
//
// ## Behavior
//
// - One GET per record: `{base}/dyndns/update?hostname=<record>&myip=<address>`
// - HTTP basic auth, token as username and secret as password
// - Any 2xx is success; anything else is a failure carrying the response body
// - No retries, no rate limiting, no caching
// - Dry-run mode logs the request instead of sending it
//
// ## Security Requirements
//
// - Token and secret NEVER appear in logs, URLs or Debug output
// - Credentials travel only in the Authorization header
//
// ## API Reference
//
// - https://api.domeneshop.no/docs/#tag/ddns/paths/~1dyndns~1update/get

use async_trait::async_trait;
use dyndns_core::config::{ApiCredentials, DdnsConfig};
use dyndns_core::traits::RecordUpdater;
use dyndns_core::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;

/// Default HTTP timeout for update requests (60 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Path of the dyndns endpoint below the API base URL
const DYNDNS_UPDATE_PATH: &str = "/dyndns/update";

/// Domeneshop dyndns updater
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the updater logs the request it would have sent
/// and reports success without contacting the API.
pub struct DomeneshopUpdater {
    /// API token and secret
    /// ⚠️ NEVER log these values
    credentials: ApiCredentials,

    /// Full URL of the dyndns update endpoint
    update_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, skip the request entirely
    dry_run: bool,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for DomeneshopUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomeneshopUpdater")
            .field("credentials", &"<REDACTED>")
            .field("update_url", &self.update_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl DomeneshopUpdater {
    /// Create a new Domeneshop updater
    ///
    /// # Parameters
    ///
    /// - `credentials`: API token and secret
    /// - `base_url`: API base URL (e.g. "https://api.domeneshop.no/v0")
    /// - `timeout`: Per-request timeout
    /// - `dry_run`: If true, log updates instead of sending them
    pub fn new(
        credentials: ApiCredentials,
        base_url: &str,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        if credentials.token.is_empty() || credentials.secret.is_empty() {
            return Err(Error::config("Domeneshop API token and secret are required"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            update_url: format!("{}{}", base_url.trim_end_matches('/'), DYNDNS_UPDATE_PATH),
            client,
            dry_run,
        })
    }

    /// Create a new updater (production/live mode) with the default timeout
    pub fn new_live(credentials: ApiCredentials, base_url: &str) -> Result<Self> {
        Self::new(credentials, base_url, DEFAULT_HTTP_TIMEOUT, false)
    }

    /// Create a new updater (dry-run mode) with the default timeout
    pub fn new_dry_run(credentials: ApiCredentials, base_url: &str) -> Result<Self> {
        Self::new(credentials, base_url, DEFAULT_HTTP_TIMEOUT, true)
    }

    /// Create from the full configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        let updater = Self::new(
            config.api.clone(),
            &config.endpoints.provider_base_url,
            Duration::from_secs(config.endpoints.update_timeout_secs),
            config.endpoints.dry_run,
        )?;

        if updater.dry_run {
            tracing::warn!("Domeneshop updater running in DRY-RUN mode - no changes will be made");
        }

        Ok(updater)
    }

    /// Whether updates are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// The dyndns endpoint URL (without query or credentials)
    pub fn update_url(&self) -> &str {
        &self.update_url
    }
}

#[async_trait]
impl RecordUpdater for DomeneshopUpdater {
    /// Update a single record
    ///
    /// # API Call
    ///
    /// ```text
    /// GET /dyndns/update?hostname=<record_name>&myip=<address>
    /// Authorization: Basic base64(token:secret)
    /// ```
    async fn update_record(&self, record_name: &str, address: IpAddr) -> Result<()> {
        let myip = address.to_string();

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send GET {}?hostname={}&myip={}",
                self.update_url,
                record_name,
                myip
            );
            return Ok(());
        }

        tracing::debug!(
            "GET {}?hostname={}&myip={}",
            self.update_url,
            record_name,
            myip
        );

        let response = self
            .client
            .get(&self.update_url)
            .basic_auth(&self.credentials.token, Some(&self.credentials.secret))
            .query(&[("hostname", record_name), ("myip", myip.as_str())])
            .send()
            .await
            .map_err(|e| Error::network(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        match status.as_u16() {
            401 | 403 => tracing::warn!(
                "Domeneshop rejected the credentials for {} (status {})",
                record_name,
                status
            ),
            404 => tracing::warn!("Domeneshop does not know hostname {}", record_name),
            429 => tracing::warn!("Domeneshop rate limit hit while updating {}", record_name),
            _ => {}
        }

        Err(Error::status(status.as_u16(), body))
    }

    fn provider_name(&self) -> &'static str {
        "domeneshop"
    }
}
