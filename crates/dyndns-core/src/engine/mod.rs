//! Core polling loop
//!
//! The PollingLoop is responsible for:
//! - Observing the public address via AddressObserver
//! - Comparing it with the last known address
//! - Updating every configured record via RecordUpdater on change
//! - Pacing itself with the two-phase [`Schedule`]
//!
//! ## Architecture
//!
//! ```text
//!   guard delay ──► AddressObserver::observe()
//!                         │
//!                         ▼
//!                 ┌──────────────┐   changed    ┌───────────────┐
//!                 │ PollingLoop  │─────────────►│ RecordUpdater │
//!                 │ (last known) │              │ (every name)  │
//!                 └──────────────┘              └───────────────┘
//!                         │
//!                         ▼
//!                 remainder delay ──► next cycle
//! ```
//!
//! ## State
//!
//! The loop starts in [`ObservedAddress::Unknown`], so the first successful
//! observation always counts as a change. A failed observation leaves the
//! state untouched and skips the cycle.

mod schedule;

pub use schedule::Schedule;

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::traits::{AddressObserver, RecordUpdater, UpdateOutcome, UpdateStatus};
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Capacity of the event channel handed out by [`PollingLoop::new`]
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// The last successfully observed public address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObservedAddress {
    /// Nothing observed yet
    #[default]
    Unknown,
    /// Address from the most recent successful observation
    Known(IpAddr),
}

impl ObservedAddress {
    /// The known address, if any
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            ObservedAddress::Unknown => None,
            ObservedAddress::Known(ip) => Some(*ip),
        }
    }
}

impl fmt::Display for ObservedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedAddress::Unknown => f.write_str("unknown"),
            ObservedAddress::Known(ip) => write!(f, "{}", ip),
        }
    }
}

/// What happened during one observe → compare → update step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The address differed from the last known one; records were updated
    Changed {
        /// Last known address before this cycle (`None` on first observation)
        previous: Option<IpAddr>,
        /// Newly observed address
        current: IpAddr,
        /// Per-record results, in configured order
        outcomes: Vec<UpdateOutcome>,
    },

    /// Same address as last time; nothing was updated
    Unchanged {
        /// The observed (and known) address
        current: IpAddr,
    },

    /// The lookup failed; state was left as it was
    ObservationFailed {
        /// Error text from the observer
        error: String,
    },
}

/// Events emitted by the PollingLoop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// Loop started
    Started {
        records_count: usize,
    },

    /// Observed address differs from the last known one
    AddressChanged {
        previous: Option<IpAddr>,
        current: IpAddr,
    },

    /// Observed address matches the last known one
    AddressUnchanged {
        current: IpAddr,
    },

    /// Address lookup failed
    ObservationFailed {
        error: String,
    },

    /// A record was pointed at the new address
    RecordUpdated {
        record_name: String,
        address: IpAddr,
    },

    /// A record update failed
    RecordUpdateFailed {
        record_name: String,
        error: String,
    },

    /// Loop stopped
    Stopped {
        reason: String,
    },
}

/// Polling dynamic DNS loop
///
/// ## Lifecycle
///
/// 1. Create with [`PollingLoop::new()`]
/// 2. Start with [`PollingLoop::run()`]
/// 3. Loop runs until the process receives Ctrl-C / SIGINT
///
/// ## Threading
///
/// Everything happens sequentially on the calling task. The last known
/// address is owned by the loop and only changed by [`PollingLoop::poll_once()`].
pub struct PollingLoop {
    /// Public address lookup
    observer: Box<dyn AddressObserver>,

    /// DNS provider update client
    updater: Box<dyn RecordUpdater>,

    /// Record names to update, in order
    pointers: Vec<String>,

    /// Guard and interval timing
    schedule: Schedule,

    /// Last successfully observed address
    last_known: ObservedAddress,

    /// When `last_known` last changed
    last_changed: Option<DateTime<Utc>>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<LoopEvent>,
}

impl PollingLoop {
    /// Create a new polling loop
    ///
    /// # Parameters
    ///
    /// - `observer`: Address observer implementation
    /// - `updater`: Record updater implementation
    /// - `config`: Configuration, already validated by the caller
    ///
    /// Only the minimum-interval floor is applied here.
    ///
    /// # Returns
    ///
    /// A tuple of (loop, event_receiver) where event_receiver yields loop events
    pub fn new(
        observer: Box<dyn AddressObserver>,
        updater: Box<dyn RecordUpdater>,
        config: &DdnsConfig,
    ) -> (Self, mpsc::Receiver<LoopEvent>) {
        if config.polling.pointers.is_empty() {
            warn!("No pointers configured; the public address will be observed but nothing updated");
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let polling_loop = Self {
            observer,
            updater,
            pointers: config.polling.pointers.clone(),
            schedule: Schedule::from_config(config),
            last_known: ObservedAddress::Unknown,
            last_changed: None,
            event_tx: tx,
        };

        (polling_loop, rx)
    }

    /// The last successfully observed address
    pub fn last_known(&self) -> ObservedAddress {
        self.last_known
    }

    /// The timing used by [`PollingLoop::run()`]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Run the loop
    ///
    /// Runs guard delay → observe → (maybe update) → remainder delay until
    /// Ctrl-C / SIGINT is received. A signal that arrives while a cycle is in
    /// flight lets that cycle finish and stops the loop at the next delay.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: The shutdown signal could not be installed
    pub async fn run(&mut self) -> Result<()> {
        // One listener for the whole run, so signals between delays are kept
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .map_err(|e| Error::Other(format!("Failed to listen for shutdown signal: {}", e)))
        };
        self.run_internal(ctrl_c).await
    }

    /// Run the loop, stopping when `shutdown_rx` fires instead of on Ctrl-C
    ///
    /// Used by embedders and tests that need a controlled shutdown. With
    /// `None` this behaves like [`PollingLoop::run()`].
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        match shutdown_rx {
            Some(rx) => {
                // A dropped sender also stops the loop
                self.run_internal(async move {
                    let _ = rx.await;
                    Ok(())
                })
                .await
            }
            None => self.run().await,
        }
    }

    async fn run_internal<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        tokio::pin!(shutdown);

        self.emit_event(LoopEvent::Started {
            records_count: self.pointers.len(),
        });

        info!(
            "Checking public address every {}s (guard {}s) for {} pointer(s)",
            self.schedule.interval().as_secs(),
            self.schedule.guard().as_secs(),
            self.pointers.len()
        );

        loop {
            if sleep_or_shutdown(self.schedule.guard(), shutdown.as_mut()).await? {
                break;
            }

            self.poll_once().await;

            if let Some(remainder) = self.schedule.remainder() {
                debug!("Sleeping for {} seconds", remainder.as_secs());
                if sleep_or_shutdown(remainder, shutdown.as_mut()).await? {
                    break;
                }
            }
        }

        info!("Shutdown signal received");
        self.emit_event(LoopEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });

        Ok(())
    }

    /// Run a single observe → compare → update step, without any delay
    pub async fn poll_once(&mut self) -> CycleOutcome {
        let current = match self.observer.observe().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!(
                    "Failed to observe public address via {}: {}; skipping this cycle",
                    self.observer.observer_name(),
                    e
                );
                let error = e.to_string();
                self.emit_event(LoopEvent::ObservationFailed {
                    error: error.clone(),
                });
                return CycleOutcome::ObservationFailed { error };
            }
        };

        debug!("Public address is {}", current);

        if self.last_known.address() == Some(current) {
            match self.last_changed {
                Some(since) => debug!("Public address unchanged since {}", since.to_rfc3339()),
                None => debug!("Public address unchanged"),
            }
            self.emit_event(LoopEvent::AddressUnchanged { current });
            return CycleOutcome::Unchanged { current };
        }

        let previous = self.last_known.address();
        info!("Public address changed from {} to {}", self.last_known, current);

        self.last_known = ObservedAddress::Known(current);
        self.last_changed = Some(Utc::now());
        self.emit_event(LoopEvent::AddressChanged { previous, current });

        let outcomes = self.updater.update(&self.pointers, current).await;

        for outcome in &outcomes {
            let event = match &outcome.status {
                UpdateStatus::Success => LoopEvent::RecordUpdated {
                    record_name: outcome.record_name.clone(),
                    address: outcome.address,
                },
                UpdateStatus::Failure { message } => LoopEvent::RecordUpdateFailed {
                    record_name: outcome.record_name.clone(),
                    error: message.clone(),
                },
            };
            self.emit_event(event);
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        if failed > 0 {
            warn!("{} of {} pointer update(s) failed", failed, outcomes.len());
        }

        CycleOutcome::Changed {
            previous,
            current,
            outcomes,
        }
    }

    /// Emit a loop event
    fn emit_event(&self, event: LoopEvent) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event");
        }
    }
}

/// Sleep for `duration`, returning `true` if shutdown completed first
///
/// `shutdown` must not be polled again once it has returned `true`.
async fn sleep_or_shutdown<F>(duration: Duration, shutdown: Pin<&mut F>) -> Result<bool>
where
    F: Future<Output = Result<()>>,
{
    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(false),
        signal = shutdown => {
            signal?;
            Ok(true)
        }
    }
}
