//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressObserver`]: Look up the current public address
//! - [`RecordUpdater`]: Point DNS records at an address via a provider API

pub mod address_observer;
pub mod record_updater;

pub use address_observer::AddressObserver;
pub use record_updater::{RecordUpdater, UpdateOutcome, UpdateStatus};
