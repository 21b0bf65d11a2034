// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`SenderAdapter`] implementation over the backend's HTTP send API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tgflow_config::model::BridgeConfig;
use tgflow_core::{HealthStatus, QueuedMessage, SenderAdapter, TgflowError};

/// Sends messages by POSTing them to `{base_url}/v1/send`.
pub struct BridgeSender {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    recipient: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_id: Option<&'a str>,
}

/// Backend reply. `error` carries the backend's reason text verbatim; it is
/// what the retry policies classify on.
#[derive(Deserialize)]
struct SendResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl BridgeSender {
    pub fn new(config: &BridgeConfig) -> Result<Self, TgflowError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TgflowError::Config(format!("bridge http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn request(&self, url: String) -> reqwest::RequestBuilder {
        let mut req = self.client.post(url);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Turn a transport-level error into a reason string the policy table
    /// recognizes as a network failure.
    fn transport_reason(err: &reqwest::Error) -> String {
        if err.is_timeout() {
            "request timeout".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            format!("network error: {err}")
        }
    }
}

#[async_trait]
impl SenderAdapter for BridgeSender {
    fn name(&self) -> &str {
        "bridge"
    }

    async fn health_check(&self) -> Result<HealthStatus, TgflowError> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "backend returned {}",
                resp.status()
            ))),
            Err(err) => Ok(HealthStatus::Unhealthy(Self::transport_reason(&err))),
        }
    }

    async fn send(&self, msg: &QueuedMessage) -> Result<(), TgflowError> {
        let url = format!("{}/v1/send", self.base_url);
        let body = SendRequest {
            recipient: &msg.recipient,
            content: &msg.content,
            template_id: msg.template_id.as_deref(),
        };

        let resp = self
            .request(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| TgflowError::Channel {
                message: Self::transport_reason(&err),
                source: Some(Box::new(err)),
            })?;

        let status = resp.status();
        if status.is_success() {
            let reply: SendResponse =
                resp.json().await.map_err(|err| TgflowError::Channel {
                    message: format!("malformed backend reply: {err}"),
                    source: Some(Box::new(err)),
                })?;
            if reply.ok {
                debug!(id = %msg.id, recipient = %msg.recipient, "bridge accepted message");
                Ok(())
            } else {
                Err(TgflowError::Channel {
                    message: reply
                        .error
                        .unwrap_or_else(|| "backend rejected the message".to_string()),
                    source: None,
                })
            }
        } else {
            // Prefer the backend's own reason text over a bare status line.
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SendResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("HTTP {status}: {}", text.trim()));
            Err(TgflowError::Channel {
                message,
                source: None,
            })
        }
    }
}
