//! HTTP remote.
//!
//! Resolves logical endpoints against a base URL and POSTs the payload as
//! JSON. Failures are classified into [`RemoteError`] so the retry executor
//! and replay policy can act on them.

use async_trait::async_trait;
use std::time::Duration;
use sync_client::RemoteEndpoint;
use sync_types::RemoteError;

/// [`RemoteEndpoint`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    http: reqwest::Client,
}

impl HttpRemote {
    /// Create a remote for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build the URL for an endpoint.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

fn classify(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Network(e.to_string())
    }
}

#[async_trait]
impl RemoteEndpoint for HttpRemote {
    async fn call(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, RemoteError> {
        let url = self.url_for(endpoint);
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if !status.is_success() {
            return Err(RemoteError::from_status(status.as_u16(), body));
        }

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        // Non-JSON success bodies are kept as text
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }
}
