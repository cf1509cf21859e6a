// # Address Observer Trait
//
// Defines the interface for looking up the caller's public address.
//
// ## Implementations
//
// - HTTP echo service: `dyndns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::AddressObserver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let observer = /* AddressObserver implementation */;
//
//     let address = observer.observe().await?;
//     println!("Public address: {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for public address lookups
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - Every call performs a fresh lookup; no caching between calls
/// - A failed or timed-out lookup returns an error, it is not retried here
/// - No side effects beyond the outbound request
///
/// The [`PollingLoop`](crate::PollingLoop) treats any error as "no change this
/// cycle" and moves on to the next sleep.
#[async_trait]
pub trait AddressObserver: Send + Sync {
    /// Look up the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The observed address
    /// - `Err(Error)`: Network failure, non-success status, or an unusable body
    async fn observe(&self) -> Result<IpAddr, crate::Error>;

    /// Get the observer name (for logging/debugging)
    fn observer_name(&self) -> &'static str;
}
