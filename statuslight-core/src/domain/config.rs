//! Poll configuration domain type

use std::num::NonZeroU64;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host polled when nothing else is configured
pub const DEFAULT_HOST: &str = "jenkins.mono-project.com";

/// Job watched when nothing else is configured
pub const DEFAULT_JOB_NAME: &str = "test-mono-mainline-codecoverage";

/// Seconds between polls when nothing else is configured
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Suffix appended to the job path to ask only for the build result
pub const RESULT_QUERY: &str = "/lastBuild/api/json?tree=result";

/// Errors produced when building a [`PollConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("host cannot be empty")]
    EmptyHost,

    #[error("invalid host '{0}': only letters, digits, '-' and '.' are allowed")]
    InvalidHost(String),

    #[error("job name cannot be empty")]
    EmptyJobName,

    #[error("invalid job name '{0}': whitespace, control characters, '?' and '#' are not allowed")]
    InvalidJobName(String),

    #[error("update interval must be at least 1 second")]
    ZeroInterval,

    #[error("invalid update interval '{0}': expected a whole number of seconds")]
    InvalidInterval(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// What to poll and how often
///
/// Fields are private so that every instance has passed validation: the
/// host is a bare DNS name or address, the job name is safe to splice into
/// a request path, and the interval is at least one second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPollConfig", into = "RawPollConfig")]
pub struct PollConfig {
    host: String,
    job_name: String,
    interval_secs: NonZeroU64,
}

impl PollConfig {
    /// Creates a validated configuration
    ///
    /// # Arguments
    /// * `host` - Job server host name (no scheme, port or path)
    /// * `job_name` - Job name as it appears in the job server URL; nested
    ///   jobs may be given as `folder/job/name`
    /// * `interval_secs` - Seconds between polls, at least 1
    pub fn new(
        host: impl Into<String>,
        job_name: impl Into<String>,
        interval_secs: u64,
    ) -> Result<Self> {
        let host = host.into().trim().to_string();
        let job_name = job_name.into().trim().to_string();

        validate_host(&host)?;
        validate_job_name(&job_name)?;
        let interval_secs = NonZeroU64::new(interval_secs).ok_or(ConfigError::ZeroInterval)?;

        Ok(Self {
            host,
            job_name,
            interval_secs,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs.get()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.get())
    }

    /// Request path for the last build result of the configured job
    ///
    /// e.g. `/job/my-job/lastBuild/api/json?tree=result`
    pub fn request_path(&self) -> String {
        format!("/job/{}{}", self.job_name, RESULT_QUERY)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            job_name: DEFAULT_JOB_NAME.to_string(),
            interval_secs: NonZeroU64::new(DEFAULT_INTERVAL_SECS).unwrap_or(NonZeroU64::MIN),
        }
    }
}

/// Parses an interval typed by a user into whole seconds
pub fn parse_interval(raw: &str) -> Result<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidInterval(raw.to_string()))?;

    if secs == 0 {
        return Err(ConfigError::ZeroInterval);
    }

    Ok(secs)
}

// =============================================================================
// Validation
// =============================================================================

fn validate_host(host: &str) -> Result<()> {
    if host.is_empty() {
        return Err(ConfigError::EmptyHost);
    }

    let valid = host.len() <= 253
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');

    if !valid {
        return Err(ConfigError::InvalidHost(host.to_string()));
    }

    Ok(())
}

fn validate_job_name(job_name: &str) -> Result<()> {
    if job_name.is_empty() {
        return Err(ConfigError::EmptyJobName);
    }

    let invalid = job_name
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '?' || c == '#');

    if invalid {
        return Err(ConfigError::InvalidJobName(job_name.to_string()));
    }

    Ok(())
}

/// Unvalidated serde representation of [`PollConfig`]
#[derive(Serialize, Deserialize)]
struct RawPollConfig {
    host: String,
    job_name: String,
    interval_secs: u64,
}

impl TryFrom<RawPollConfig> for PollConfig {
    type Error = ConfigError;

    fn try_from(raw: RawPollConfig) -> Result<Self> {
        PollConfig::new(raw.host, raw.job_name, raw.interval_secs)
    }
}

impl From<PollConfig> for RawPollConfig {
    fn from(config: PollConfig) -> Self {
        RawPollConfig {
            host: config.host,
            job_name: config.job_name,
            interval_secs: config.interval_secs.get(),
        }
    }
}
