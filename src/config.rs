//! Configuration loader for the `codemetal-sitetwin` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::{env, net::SocketAddr, time::Duration};

use anyhow::{anyhow, bail, Result};

/// Parse an optional environment variable into `$ty`, falling back to a default.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Base URL of the text-generation backend.
    pub llm_api_url: String,

    /// Optional bearer token for the text-generation backend.
    pub llm_api_key: Option<String>,

    /// Model name forwarded with every generation request.
    pub llm_model: String,

    /// Per-call timeout for the text-generation backend.
    pub llm_timeout: Duration,

    /// Period between two simulation ticks.
    pub tick_interval: Duration,

    /// Probability of a forced above-limit spike, per sensor per tick.
    pub spike_probability: f64,

    /// Seed for the simulation RNG. `None` draws from OS entropy.
    pub sim_seed: Option<u64>,

    /// Construction site name used in community briefs.
    pub site_name: String,

    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
}

pub const DEFAULT_LLM_MODEL: &str = "llama3.1";
pub const DEFAULT_SITE_NAME: &str = "EcoConstruct Site A";
pub const DEFAULT_SPIKE_PROBABILITY: f64 = 0.005;
pub const DEFAULT_TICK_SECS: u64 = 60;

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `LLM_API_URL` – text-generation backend base URL
///
/// Optional:
/// - `LLM_API_KEY` – bearer token (default: none)
/// - `LLM_MODEL` – model name (default: `llama3.1`)
/// - `LLM_TIMEOUT_SECS` – per-call timeout (default: 30)
/// - `TICK_INTERVAL_SECS` – simulation tick period (default: 60)
/// - `SPIKE_PROBABILITY` – spike injection probability (default: 0.005)
/// - `SIM_SEED` – RNG seed for reproducible runs (default: entropy)
/// - `SITE_NAME` – site name for briefs (default: `EcoConstruct Site A`)
/// - `BIND_ADDR` – listen address (default: `0.0.0.0:8080`)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let llm_api_url = require_env!("LLM_API_URL");
    let llm_api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty());
    let llm_model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string());
    let llm_timeout_secs = parse_env!("LLM_TIMEOUT_SECS", u64, 30);
    let tick_secs = parse_env!("TICK_INTERVAL_SECS", u64, DEFAULT_TICK_SECS);
    let spike_probability = parse_env!("SPIKE_PROBABILITY", f64, DEFAULT_SPIKE_PROBABILITY);
    let sim_seed = env::var("SIM_SEED")
        .ok()
        .map(|v| v.trim().parse::<u64>())
        .transpose()
        .map_err(|e| anyhow!("Invalid SIM_SEED: {}", e))?;
    let site_name = env::var("SITE_NAME").unwrap_or_else(|_| DEFAULT_SITE_NAME.to_string());
    let bind_addr = parse_env!(
        "BIND_ADDR",
        SocketAddr,
        SocketAddr::from(([0, 0, 0, 0], 8080))
    );

    let config = Config {
        llm_api_url,
        llm_api_key,
        llm_model,
        llm_timeout: Duration::from_secs(llm_timeout_secs),
        tick_interval: Duration::from_secs(tick_secs),
        spike_probability,
        sim_seed,
        site_name,
        bind_addr,
    };
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject values that parse but make no sense at runtime.
    pub fn validate(&self) -> Result<()> {
        // ---
        if !(0.0..=1.0).contains(&self.spike_probability) {
            bail!(
                "SPIKE_PROBABILITY must be within [0, 1], got {}",
                self.spike_probability
            );
        }
        if self.tick_interval.is_zero() {
            bail!("TICK_INTERVAL_SECS must be greater than zero");
        }
        Ok(())
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the backend API key while showing all other configuration values
    /// that were loaded.
    pub fn log_config(&self) {
        // ---
        let masked_key = match &self.llm_api_key {
            Some(_) => "****",
            None => "(none)",
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  LLM_API_URL        : {}", self.llm_api_url);
        tracing::info!("  LLM_API_KEY        : {}", masked_key);
        tracing::info!("  LLM_MODEL          : {}", self.llm_model);
        tracing::info!("  LLM_TIMEOUT_SECS   : {}", self.llm_timeout.as_secs());
        tracing::info!("  TICK_INTERVAL_SECS : {}", self.tick_interval.as_secs());
        tracing::info!("  SPIKE_PROBABILITY  : {}", self.spike_probability);
        tracing::info!("  SIM_SEED           : {:?}", self.sim_seed);
        tracing::info!("  SITE_NAME          : {}", self.site_name);
        tracing::info!("  BIND_ADDR          : {}", self.bind_addr);
    }
}

#[cfg(test)]
pub(crate) fn test_config(llm_api_url: &str) -> Config {
    // ---
    Config {
        llm_api_url: llm_api_url.to_string(),
        llm_api_key: None,
        llm_model: DEFAULT_LLM_MODEL.to_string(),
        llm_timeout: Duration::from_secs(5),
        tick_interval: Duration::from_secs(DEFAULT_TICK_SECS),
        spike_probability: DEFAULT_SPIKE_PROBABILITY,
        sim_seed: Some(7),
        site_name: DEFAULT_SITE_NAME.to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        // ---
        let cfg = test_config("http://localhost:11434");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_spike_probability_out_of_range() {
        // ---
        let mut cfg = test_config("http://localhost:11434");
        cfg.spike_probability = 1.5;
        assert!(cfg.validate().is_err());

        cfg.spike_probability = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        // ---
        let mut cfg = test_config("http://localhost:11434");
        cfg.tick_interval = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }
}
