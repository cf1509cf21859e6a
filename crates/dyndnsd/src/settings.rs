//! Command line and configuration file handling
//!
//! The configuration file is TOML (see `DdnsConfig`). A few values can be
//! overridden from the environment so secrets can stay out of the file:
//!
//! - `DDNS_API_TOKEN`: API token
//! - `DDNS_API_SECRET`: API secret
//! - `DDNS_LOG_LEVEL`: trace, debug, info, warn or error
//! - `DDNS_MODE`: set to `dry-run` to log updates instead of sending them

use anyhow::{Context, Result};
use clap::Parser;
use dyndns_core::DdnsConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "dyndnsd")]
#[command(about = "Keeps Domeneshop DNS records pointed at this host's public address", version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Log updates instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single observation cycle (no delays) and exit
    #[arg(long)]
    pub once: bool,
}

/// Read and parse the configuration file
pub fn load_file(path: &Path) -> Result<DdnsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: DdnsConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables
pub fn apply_env_overrides<F>(config: &mut DdnsConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup("DDNS_API_TOKEN") {
        config.api.token = token;
    }
    if let Some(secret) = lookup("DDNS_API_SECRET") {
        config.api.secret = secret;
    }
    if let Some(level) = lookup("DDNS_LOG_LEVEL") {
        config.log.level = level;
    }
    if lookup("DDNS_MODE").is_some_and(|mode| mode.eq_ignore_ascii_case("dry-run")) {
        config.endpoints.dry_run = true;
    }
}

/// Load, override and validate the configuration for this invocation
pub fn load(cli: &Cli) -> Result<DdnsConfig> {
    let mut config = load_file(&cli.config)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    if cli.dry_run {
        config.endpoints.dry_run = true;
    }

    config.validate().context("Configuration validation failed")?;

    Ok(config)
}

/// Map a validated log level string to a tracing level
pub fn log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
