//! Feishu/Lark custom bot delivery
//!
//! Posts rendered cards to a bot webhook URL. There is no retry: a failed
//! delivery is reported once to the caller.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::card::CardDocument;

#[cfg(test)]
mod tests;

/// Trait for card delivery
#[async_trait::async_trait]
pub trait CardSender: Send + Sync {
    async fn send(&self, card: &CardDocument) -> Result<()>;
}

/// Bot webhook reply
///
/// Current bots answer `{"code": 0, "msg": "success"}`; older ones use
/// `StatusCode`/`StatusMessage`.
#[derive(Debug, Default, Deserialize)]
struct BotResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(rename = "StatusCode", default)]
    status_code: Option<i64>,
    #[serde(rename = "StatusMessage", default)]
    status_message: Option<String>,
}

impl BotResponse {
    /// Non-zero status code with its message, if the bot rejected the card
    fn rejection(&self) -> Option<(i64, &str)> {
        let code = self.code.or(self.status_code)?;
        if code == 0 {
            return None;
        }
        let msg = self
            .msg
            .as_deref()
            .or(self.status_message.as_deref())
            .unwrap_or("");
        Some((code, msg))
    }
}

/// Production client for a Feishu bot webhook
pub struct FeishuClient {
    webhook_url: String,
    http: Client,
}

impl FeishuClient {
    /// Create a client posting to `webhook_url`, each request bounded by `timeout`
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("sentry-feishu/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            webhook_url: webhook_url.into(),
            http,
        })
    }
}

#[async_trait::async_trait]
impl CardSender for FeishuClient {
    async fn send(&self, card: &CardDocument) -> Result<()> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(card)
            .send()
            .await
            .context("Failed to reach Feishu webhook")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read Feishu reply")?;
        if !status.is_success() {
            bail!("Feishu webhook HTTP {}: {}", status.as_u16(), body);
        }

        // Bots reply 200 even when they reject the card
        let reply: BotResponse = serde_json::from_str(&body).unwrap_or_default();
        if let Some((code, msg)) = reply.rejection() {
            bail!("Feishu rejected card (code {}): {}", code, msg);
        }

        tracing::debug!(status = status.as_u16(), "card delivered");
        Ok(())
    }
}
