use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};
use tracing::debug;

use crate::response::RawResponse;

/// Sends one GET request and returns the raw response.
///
/// This is the only thing the service needs from the network, so tests can swap in a double.
#[async_trait]
pub trait HttpClient: Send + Sync + Debug {
    async fn send_request(&self, url: &str) -> Result<RawResponse>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    http: Client,
    timeout: Option<Duration>,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send_request(&self, url: &str) -> Result<RawResponse> {
        let mut request = self.http.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        // The URL carries the API key; keep it out of logs and error messages.
        let res = request
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send forecast request")?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read forecast response body")?;

        debug!(%status, bytes = body.len(), "forecast response received");

        Ok(RawResponse { status, headers, body })
    }
}
