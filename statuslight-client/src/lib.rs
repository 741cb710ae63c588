//! Status Light job server client
//!
//! Fetches the last build result of a job from the CI server over HTTPS.
//!
//! One request per connection: every fetch opens a fresh connection, sends
//! `Connection: close` and reads the body until the server hangs up.
//! Redirects are not followed. Once connected, the server has the response
//! timeout to start answering; the whole exchange is additionally capped at
//! the connect timeout plus the response timeout.
//!
//! # Example
//!
//! ```no_run
//! use statuslight_client::{JobServerClient, StatusSource};
//! use statuslight_core::{PollConfig, parse_status};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JobServerClient::new()?;
//!     let config = PollConfig::new("ci.example.org", "nightly", 30)?;
//!
//!     let body = client.fetch_status_body(&config).await?;
//!     println!("Status: {}", parse_status(&body));
//!     Ok(())
//! }
//! ```

pub mod error;
mod status;

pub use error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::{Client, redirect};
use statuslight_core::PollConfig;
use std::time::Duration;

/// Port the job server is reached on
pub const DEFAULT_PORT: u16 = 443;

/// Maximum time to establish the TCP and TLS connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum time to wait for the server to answer once connected
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bytes of response body kept for parsing; the rest is discarded
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Source of raw job status documents
///
/// The poll controller only depends on this trait, which keeps the
/// transport swappable and lets tests script responses and failures.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches the raw response body describing the job's last build
    ///
    /// # Arguments
    /// * `config` - Host and job to query
    ///
    /// # Errors
    /// Returns [`ClientError::ConnectionFailure`] when the server cannot be
    /// reached and [`ClientError::ResponseTimeout`] when it does not answer
    /// in time. Non-success HTTP status codes are not errors: their body is
    /// returned like any other.
    async fn fetch_status_body(&self, config: &PollConfig) -> Result<Vec<u8>>;
}

/// HTTPS client for the job server's JSON API
#[derive(Debug, Clone)]
pub struct JobServerClient {
    /// HTTP client instance
    client: Client,
    /// "https" in production, "http" for local test servers
    scheme: &'static str,
    port: u16,
    connect_timeout: Duration,
    response_timeout: Duration,
    max_body_bytes: usize,
}

impl JobServerClient {
    /// Create a client with the default timeouts
    pub fn new() -> Result<Self> {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT, DEFAULT_RESPONSE_TIMEOUT)
    }

    /// Create a client with custom timeouts
    ///
    /// # Arguments
    /// * `connect_timeout` - Bound on establishing the connection
    /// * `response_timeout` - Bound on waiting for the response once
    ///   connected, and again on reading its body
    pub fn with_timeouts(connect_timeout: Duration, response_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(response_timeout)
            .redirect(redirect::Policy::none())
            .http1_only()
            .build()?;

        Ok(Self {
            connect_timeout,
            response_timeout,
            ..Self::with_client(client)
        })
    }

    /// Create a client around a configured reqwest Client
    ///
    /// The reqwest client's own timeouts are not known here; the default
    /// bounds are used when computing the send deadline.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            scheme: "https",
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Talk plain HTTP on the given port instead of HTTPS on 443
    ///
    /// Only meant for local test servers.
    pub fn plain_http(mut self, port: u16) -> Self {
        self.scheme = "http";
        self.port = port;
        self
    }

    /// Limit how much of the response body is kept
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Upper bound on sending a request and receiving the response head
    pub(crate) fn send_deadline(&self) -> Duration {
        self.connect_timeout.saturating_add(self.response_timeout)
    }

    /// Full URL queried for a configuration
    pub fn status_url(&self, config: &PollConfig) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme,
            config.host(),
            self.port,
            config.request_path()
        )
    }
}
