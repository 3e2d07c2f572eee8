// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP transport for gateway API calls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, ACCEPT_LANGUAGE},
    Client,
};
use tracing::{debug, warn};

use super::error::EpayError;

/// Default bound on a single gateway call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends a form-encoded POST to the gateway and returns the raw body.
///
/// Implementations must surface timeouts and network failures as
/// [`EpayError::Transport`] and must not retry.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String, EpayError>;
}

/// reqwest-backed transport with a fixed per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Result<Self, EpayError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, EpayError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("epay-gateway/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EpayError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, url: &str, err: reqwest::Error) -> EpayError {
        if err.is_timeout() {
            warn!(url = %url, timeout_ms = self.timeout.as_millis() as u64, "Epay request timed out");
            EpayError::Transport(format!("POST {url} timed out after {:?}", self.timeout))
        } else {
            warn!(url = %url, error = %err, "Epay request failed");
            EpayError::Transport(format!("POST {url} failed: {err}"))
        }
    }
}

#[async_trait]
impl GatewayTransport for HttpTransport {
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String, EpayError> {
        debug!(url = %url, fields = form.len(), "Epay POST");

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "*/*")
            .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.8")
            .form(form)
            .send()
            .await
            .map_err(|e| self.map_error(url, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_error(url, e))?;

        if !status.is_success() {
            return Err(EpayError::Transport(format!(
                "POST {url} returned {status}: {body}"
            )));
        }

        Ok(body)
    }
}
