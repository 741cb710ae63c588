//! Job status endpoint

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONNECTION};
use statuslight_core::PollConfig;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::{JobServerClient, StatusSource};

/// Accept header sent with every status request
const ACCEPT_VALUE: &str = "text/html, application/xhtml+xml, */*";

#[async_trait]
impl StatusSource for JobServerClient {
    async fn fetch_status_body(&self, config: &PollConfig) -> Result<Vec<u8>> {
        let url = self.status_url(config);
        debug!("Requesting {}", url);

        let request = self
            .client
            .get(&url)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(CONNECTION, "close")
            .send();

        // The client's read timeout bounds the wait once connected
        let mut response = match timeout(self.send_deadline(), request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(ClientError::from_transport(
                    config.host(),
                    e,
                    self.response_timeout,
                ));
            }
            Err(_) => return Err(ClientError::ResponseTimeout(self.response_timeout)),
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Job server answered {} for {}", status, url);
        }

        let max = self.max_body_bytes;
        let mut body = Vec::new();
        let read = async {
            while let Some(chunk) = response.chunk().await? {
                let room = max - body.len();
                if chunk.len() >= room {
                    body.extend_from_slice(&chunk[..room]);
                    debug!("Response body truncated to {} bytes", max);
                    break;
                }
                body.extend_from_slice(&chunk);
            }
            Ok::<_, reqwest::Error>(())
        };

        timeout(self.response_timeout, read)
            .await
            .map_err(|_| ClientError::ResponseTimeout(self.response_timeout))?
            .map_err(|e| ClientError::from_transport(config.host(), e, self.response_timeout))?;

        debug!("Received {} byte(s) from {}", body.len(), config.host());

        Ok(body)
    }
}
