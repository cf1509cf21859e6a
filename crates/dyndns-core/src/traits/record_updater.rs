// # Record Updater Trait
//
// Defines the interface for pointing DNS records at an address via a
// provider's dynamic update API.
//
// ## Implementations
//
// - Domeneshop: `dyndns-provider-domeneshop` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::RecordUpdater;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let updater = /* RecordUpdater implementation */;
//
//     let names = vec!["home.example.no".to_string()];
//     for outcome in updater.update(&names, "1.2.3.4".parse()?).await {
//         println!("{}: {:?}", outcome.record_name, outcome.status);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;
use tracing::{error, info};

/// Result of a single record update attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The provider accepted the update
    Success,
    /// The update failed
    Failure {
        /// Response body or transport error text
        message: String,
    },
}

/// Per-record outcome of an update batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The DNS record name
    pub record_name: String,
    /// The address the record was pointed at
    pub address: IpAddr,
    /// Success or failure with diagnostic
    pub status: UpdateStatus,
}

impl UpdateOutcome {
    /// Create a successful outcome
    pub fn success(record_name: impl Into<String>, address: IpAddr) -> Self {
        Self {
            record_name: record_name.into(),
            address,
            status: UpdateStatus::Success,
        }
    }

    /// Create a failed outcome
    pub fn failure(record_name: impl Into<String>, address: IpAddr, message: impl Into<String>) -> Self {
        Self {
            record_name: record_name.into(),
            address,
            status: UpdateStatus::Failure {
                message: message.into(),
            },
        }
    }

    /// Whether the update succeeded
    pub fn is_success(&self) -> bool {
        self.status == UpdateStatus::Success
    }
}

/// Trait for DNS provider update implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - One request per record name, no retries, no rate limiting
/// - Requests carry credentials as structured auth, never in a logged URL
/// - Success is an HTTP success status; anything else is an error whose
///   diagnostic is the response body
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Point a single record at `address`
    ///
    /// # Parameters
    ///
    /// - `record_name`: The DNS record name (e.g. "home.example.no")
    /// - `address`: The address to set
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the update
    /// - `Err(Error)`: Transport failure or non-success status
    async fn update_record(&self, record_name: &str, address: IpAddr) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Point every record in `names` at `address`
    ///
    /// Records are updated one at a time, in order. A failure for one record
    /// does not stop the remaining records from being attempted.
    async fn update(&self, names: &[String], address: IpAddr) -> Vec<UpdateOutcome> {
        let mut outcomes = Vec::with_capacity(names.len());

        for name in names {
            info!("Updating pointer {} to {}", name, address);

            let outcome = match self.update_record(name, address).await {
                Ok(()) => {
                    info!("Updated pointer {} to {}", name, address);
                    UpdateOutcome::success(name.as_str(), address)
                }
                Err(e) => {
                    error!(
                        "Failed to update pointer {} to {} via {}: {}",
                        name,
                        address,
                        self.provider_name(),
                        e
                    );
                    UpdateOutcome::failure(name.as_str(), address, e.diagnostic())
                }
            };

            outcomes.push(outcome);
        }

        outcomes
    }
}
