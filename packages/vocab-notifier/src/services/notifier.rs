use std::fmt;
use std::future::Future;

use serde::Serialize;
use tracing::{error, info};

use crate::config::WebhookConfig;

/// Suppresses link embeds on the posted message.
const SUPPRESS_EMBEDS_FLAG: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered { status: u16 },
    Failed(NotifyFailure),
}

impl NotifyOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotifyOutcome::Delivered { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyFailure {
    Status(u16),
    Transport(String),
}

impl fmt::Display for NotifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyFailure::Status(code) => write!(f, "webhook returned HTTP {code}"),
            NotifyFailure::Transport(reason) => write!(f, "webhook request failed: {reason}"),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> impl Future<Output = NotifyOutcome> + Send;
}

#[derive(Debug, Serialize)]
pub(crate) struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
    avatar_url: Option<&'a str>,
    flags: u32,
}

/// Posts messages to a Discord-compatible incoming webhook.
#[derive(Clone)]
pub struct DiscordWebhook {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(config: WebhookConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: WebhookConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub(crate) fn payload<'a>(&'a self, message: &'a str) -> WebhookPayload<'a> {
        WebhookPayload {
            content: message,
            username: &self.config.username,
            avatar_url: self.config.avatar_url.as_deref(),
            flags: SUPPRESS_EMBEDS_FLAG,
        }
    }
}

impl Notifier for DiscordWebhook {
    async fn notify(&self, message: &str) -> NotifyOutcome {
        // `.json()` sets `Content-Type: application/json`.
        let result = self
            .client
            .post(self.config.url.clone())
            .json(&self.payload(message))
            .timeout(self.config.timeout)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                let status = resp.status().as_u16();
                info!(status = status, "Message sent to webhook");
                NotifyOutcome::Delivered { status }
            }
            Ok(resp) => {
                let failure = NotifyFailure::Status(resp.status().as_u16());
                error!(error = %failure, "Failed to send message to webhook");
                NotifyOutcome::Failed(failure)
            }
            Err(e) => {
                let failure = NotifyFailure::Transport(e.to_string());
                error!(error = %failure, "Failed to send message to webhook");
                NotifyOutcome::Failed(failure)
            }
        }
    }
}
