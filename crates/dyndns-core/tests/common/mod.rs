//! Test doubles and common utilities for polling loop contract tests
//!
//! The doubles are stateless towards the outside world: the observer replays a
//! script, the updater records calls and fails the names it was told to fail.

#![allow(dead_code)]

use dyndns_core::config::{ApiCredentials, DdnsConfig};
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{AddressObserver, RecordUpdater};
use std::collections::{HashSet, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// One scripted lookup result
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Lookup returns this address
    Address(IpAddr),
    /// Lookup fails with a transport error
    Fail,
}

/// Shorthand for a successful step from a dotted string
pub fn ok(ip: &str) -> Step {
    Step::Address(ip.parse().expect("valid test address"))
}

/// An AddressObserver that replays a fixed script
pub struct ScriptedObserver {
    /// Remaining steps
    script: Arc<Mutex<VecDeque<Step>>>,
    /// Address returned once the script runs out (None = fail)
    fallback: Option<IpAddr>,
    /// Clock readings taken at each observe() call
    observed_at: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedObserver {
    /// Create an observer that replays `steps`, then fails
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into())),
            fallback: None,
            observed_at: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create an observer that always returns `ip`
    pub fn repeating(ip: IpAddr) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Some(ip),
            observed_at: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create an observer that shares the script and call log with `other`
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            fallback: other.fallback,
            observed_at: Arc::clone(&other.observed_at),
        }
    }

    /// Number of observe() calls so far
    pub fn observe_call_count(&self) -> usize {
        self.observed_at.lock().unwrap().len()
    }

    /// Clock readings at each observe() call
    pub fn observed_at(&self) -> Vec<Instant> {
        self.observed_at.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AddressObserver for ScriptedObserver {
    async fn observe(&self) -> Result<IpAddr> {
        self.observed_at.lock().unwrap().push(Instant::now());

        let step = self.script.lock().unwrap().pop_front();
        match (step, self.fallback) {
            (Some(Step::Address(ip)), _) => Ok(ip),
            (Some(Step::Fail), _) => Err(Error::network("connection refused")),
            (None, Some(ip)) => Ok(ip),
            (None, None) => Err(Error::network("script exhausted")),
        }
    }

    fn observer_name(&self) -> &'static str {
        "scripted"
    }
}

/// A RecordUpdater that records every call
pub struct RecordingUpdater {
    /// Every (record, address) passed to update_record(), in order
    calls: Arc<Mutex<Vec<(String, IpAddr)>>>,
    /// Records that answer with a non-success status
    failing: Arc<HashSet<String>>,
}

impl RecordingUpdater {
    /// Create an updater that accepts every record
    pub fn new() -> Self {
        Self::failing(&[])
    }

    /// Create an updater that rejects the given records with HTTP 500
    pub fn failing(names: &[&str]) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(names.iter().map(|n| n.to_string()).collect()),
        }
    }

    /// Create an updater that shares counters with `other`
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            calls: Arc::clone(&other.calls),
            failing: Arc::clone(&other.failing),
        }
    }

    /// Every (record, address) pair attempted so far
    pub fn calls(&self) -> Vec<(String, IpAddr)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of update batches seen so far
    ///
    /// A batch is a run of consecutive calls for the same address. The loop
    /// only updates on a change, so consecutive batches never share one.
    pub fn batch_count(&self) -> usize {
        let calls = self.calls.lock().unwrap();
        let switches = calls.windows(2).filter(|pair| pair[0].1 != pair[1].1).count();
        switches + usize::from(!calls.is_empty())
    }
}

#[async_trait::async_trait]
impl RecordUpdater for RecordingUpdater {
    async fn update_record(&self, record_name: &str, address: IpAddr) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((record_name.to_string(), address));

        if self.failing.contains(record_name) {
            return Err(Error::status(500, format!("server error for {}", record_name)));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Standard pointer set used across tests
pub const POINTERS: [&str; 3] = ["home.example.no", "vpn.example.no", "nas.example.no"];

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(update_interval: u64, pointers: &[&str]) -> DdnsConfig {
    DdnsConfig::new(
        ApiCredentials::new("test-token", "test-secret"),
        update_interval,
        pointers.iter().map(|p| p.to_string()).collect(),
    )
}

/// Shorthand for parsing a test address
pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid test address")
}
