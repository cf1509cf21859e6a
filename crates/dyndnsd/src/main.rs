// # dyndnsd - Dynamic DNS Daemon
//
// The dyndnsd daemon is a thin integration layer responsible for:
// 1. Reading configuration from a TOML file (plus environment overrides)
// 2. Initializing logging and the runtime
// 3. Constructing the address observer and record updater
// 4. Running the polling loop until SIGINT / Ctrl-C
//
// All change-detection logic lives in dyndns-core.
//
// ## Example
//
// ```bash
// cat > config.toml <<EOF
// [api]
// token = "your_token"
// secret = "your_secret"
//
// [config]
// update_interval = 300
// pointers = ["home.example.no"]
// EOF
//
// dyndnsd --config config.toml
// ```

mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use dyndns_core::{CycleOutcome, DdnsConfig, PollingLoop};
use dyndns_ip_http::HttpAddressObserver;
use dyndns_provider_domeneshop::DomeneshopUpdater;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use crate::settings::Cli;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match settings::load(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings::log_level(&config.log.level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd");
    info!("Loaded config from {}: {:?}", cli.config.display(), config);

    let polling_loop = match build_loop(&config) {
        Ok(polling_loop) => polling_loop,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let outcome = if cli.once {
            run_once(polling_loop).await
        } else {
            run_daemon(polling_loop).await
        };

        match outcome {
            Ok(()) => DdnsExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Construct the observer, updater and loop from configuration
fn build_loop(config: &DdnsConfig) -> Result<PollingLoop> {
    let observer = HttpAddressObserver::from_config(&config.endpoints)
        .context("Failed to create address observer")?;
    let updater =
        DomeneshopUpdater::from_config(config).context("Failed to create record updater")?;

    info!("Address lookup: {}", observer.url());
    info!("Record updates: {}", updater.update_url());
    for pointer in &config.polling.pointers {
        info!("Managing pointer: {}", pointer);
    }

    // Events are only consumed by embedders; the daemon relies on logs
    let (polling_loop, _events) = PollingLoop::new(Box::new(observer), Box::new(updater), config);

    Ok(polling_loop)
}

/// Run the loop until a shutdown signal is received
async fn run_daemon(mut polling_loop: PollingLoop) -> Result<()> {
    polling_loop.run().await?;
    info!("Shutting down daemon");
    Ok(())
}

/// Run exactly one cycle and fail if anything in it failed
async fn run_once(mut polling_loop: PollingLoop) -> Result<()> {
    match polling_loop.poll_once().await {
        CycleOutcome::ObservationFailed { error } => {
            anyhow::bail!("Public address lookup failed: {}", error)
        }
        CycleOutcome::Unchanged { current } => {
            info!("Public address {} unchanged", current);
            Ok(())
        }
        CycleOutcome::Changed { current, outcomes, .. } => {
            let failed: Vec<&str> = outcomes
                .iter()
                .filter(|o| !o.is_success())
                .map(|o| o.record_name.as_str())
                .collect();

            if !failed.is_empty() {
                anyhow::bail!("Failed to update pointer(s) to {}: {}", current, failed.join(", "));
            }

            info!("All {} pointer(s) now point at {}", outcomes.len(), current);
            Ok(())
        }
    }
}
