// # dyndns-core
//
// Core library for the polling dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the change-detection-and-propagation loop:
// - **AddressObserver**: Trait for looking up the current public address
// - **RecordUpdater**: Trait for pointing DNS records at an address via a provider API
// - **PollingLoop**: Owns the last known address and drives the guard/interval timing
// - **DdnsConfig**: Immutable configuration threaded into the components at startup
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Explicit Wiring**: Components are constructed once and passed in, no globals
// 3. **Strictly Sequential**: observe → compare → update → sleep, one step at a time
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{AddressObserver, RecordUpdater, UpdateOutcome, UpdateStatus};
pub use engine::{CycleOutcome, LoopEvent, ObservedAddress, PollingLoop, Schedule};
pub use config::{ApiCredentials, DdnsConfig, EndpointConfig, IpVersion, LOOP_GUARD_SECS};
pub use error::{Error, Result};
