use crate::config::NotifierConfig;
use crate::session::UserId;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Delivers a text message to a user. Best effort: callers log failures and
/// move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, user: UserId, message: &str) -> Result<()>;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, user: UserId, message: &str) -> Result<()> {
        info!("Notification for user {}: {}", user, message);
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: UserId,
    text: &'a str,
}

/// Sends messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl TelegramNotifier {
    /// `None` when no bot token is configured
    pub fn from_config(config: &NotifierConfig) -> Result<Option<Self>> {
        let token = config.telegram_bot_token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build notifier HTTP client")?;

        Ok(Some(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                token
            ),
        }))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, user: UserId, message: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendMessage {
                chat_id: user,
                text: message,
            })
            .send()
            .await
            .context("Failed to reach Telegram")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Telegram rejected message ({}): {}", status, body);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telegram_requires_token() {
        let config = NotifierConfig::default();
        assert!(TelegramNotifier::from_config(&config).unwrap().is_none());

        let config = NotifierConfig {
            telegram_bot_token: "123:abc".to_string(),
            api_base: "https://api.telegram.org/".to_string(),
        };
        let notifier = TelegramNotifier::from_config(&config).unwrap().unwrap();
        assert_eq!(
            notifier.endpoint,
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
