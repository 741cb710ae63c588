//! Device configuration
//!
//! Start-up settings: where the front end listens, what to poll first,
//! and the timing of the tick loop and the transport. Everything here is
//! read once at boot; the poll configuration can later be changed from
//! the front end but is never persisted.

use statuslight_core::PollConfig;
use statuslight_core::domain::config::{DEFAULT_HOST, DEFAULT_INTERVAL_SECS, DEFAULT_JOB_NAME};
use std::net::SocketAddr;
use std::time::Duration;

/// Device configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP front end binds to
    pub bind_addr: String,

    /// Initial job server host, job and poll interval
    pub poll: PollConfig,

    /// Time between scheduler ticks
    pub tick_period: Duration,

    /// Bound on establishing the connection to the job server
    pub connect_timeout: Duration,

    /// Bound on waiting for the job server's response
    pub response_timeout: Duration,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - STATUSLIGHT_BIND_ADDR (default: 0.0.0.0:80)
    /// - STATUSLIGHT_HOST (default: jenkins.mono-project.com)
    /// - STATUSLIGHT_JOB (default: test-mono-mainline-codecoverage)
    /// - STATUSLIGHT_UPDATE_INTERVAL (seconds, default: 30)
    /// - STATUSLIGHT_TICK_MILLIS (default: 100)
    /// - STATUSLIGHT_CONNECT_TIMEOUT (seconds, default: 10)
    /// - STATUSLIGHT_RESPONSE_TIMEOUT (seconds, default: 5)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Reads and validates configuration from a variable lookup
    ///
    /// An explicit setting that is invalid is an error, never replaced by
    /// its default.
    pub fn load(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config = Self::from_lookup(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Creates configuration from an arbitrary variable lookup
    ///
    /// Unparsable numbers fall back to their defaults; an invalid host or
    /// job name is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let bind_addr = lookup("STATUSLIGHT_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:80".to_string());

        let poll = PollConfig::new(
            lookup("STATUSLIGHT_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            lookup("STATUSLIGHT_JOB").unwrap_or_else(|| DEFAULT_JOB_NAME.to_string()),
            number("STATUSLIGHT_UPDATE_INTERVAL", DEFAULT_INTERVAL_SECS),
        )
        .map_err(|e| anyhow::anyhow!("Invalid poll configuration: {}", e))?;

        Ok(Self {
            bind_addr,
            poll,
            tick_period: Duration::from_millis(number("STATUSLIGHT_TICK_MILLIS", 100)),
            connect_timeout: Duration::from_secs(number("STATUSLIGHT_CONNECT_TIMEOUT", 10)),
            response_timeout: Duration::from_secs(number("STATUSLIGHT_RESPONSE_TIMEOUT", 5)),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!("bind_addr must be an address like 0.0.0.0:80");
        }

        if self.tick_period.is_zero() {
            anyhow::bail!("tick_period must be greater than 0");
        }

        if self.connect_timeout.is_zero() {
            anyhow::bail!("connect_timeout must be greater than 0");
        }

        if self.response_timeout.is_zero() {
            anyhow::bail!("response_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:80".to_string(),
            poll: PollConfig::default(),
            tick_period: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(10),
            response_timeout: Duration::from_secs(5),
        }
    }
}
