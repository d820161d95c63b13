//! One-shot channel over HTTP POST.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::types::{McpError, McpResult};

use super::channel::OneShotChannel;

#[derive(Debug, Clone)]
pub struct HttpOneShot {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpOneShot {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OneShotChannel for HttpOneShot {
    async fn exchange(&self, payload: String) -> McpResult<Option<String>> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::ACCEPTED {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(McpError::Transport(format!(
                "{} returned HTTP {status}",
                self.endpoint
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;
        Ok(Some(body))
    }
}
