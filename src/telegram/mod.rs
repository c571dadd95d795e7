use crate::config::TelegramConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, Recipient};

#[cfg(test)]
use mockall::automock;

/// Outbound channel for alerts and reports.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}

pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
}

impl TelegramNotifier {
    /// `chat_id` is either a numeric chat id or a channel username such as `@pump_alerts`.
    pub fn new(bot_token: &str, chat_id: &str) -> Result<Self> {
        if bot_token.trim().is_empty() {
            return Err(Error::ConfigError("Telegram bot token cannot be empty".into()));
        }
        Ok(Self {
            bot: Bot::new(bot_token.trim()),
            chat: parse_recipient(chat_id)?,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.bot
            .send_message(self.chat.clone(), message)
            .parse_mode(ParseMode::Html)
            .disable_web_page_preview(true)
            .await?;
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        info!("Notification:\n{}", message);
        Ok(())
    }
}

/// Telegram when enabled and configured, the log otherwise.
pub fn notifier_from_config(config: &TelegramConfig) -> Result<Arc<dyn Notifier>> {
    if !config.enable_notifications {
        info!("Telegram notifications disabled, alerts will be logged");
        return Ok(Arc::new(LogNotifier));
    }
    if config.bot_token.trim().is_empty() || config.chat_id.trim().is_empty() {
        warn!("Telegram credentials missing, alerts will be logged");
        return Ok(Arc::new(LogNotifier));
    }
    Ok(Arc::new(TelegramNotifier::new(&config.bot_token, &config.chat_id)?))
}

fn parse_recipient(chat_id: &str) -> Result<Recipient> {
    let chat_id = chat_id.trim();
    if let Ok(id) = chat_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    if chat_id.starts_with('@') && chat_id.len() > 1 {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }
    Err(Error::ConfigError(format!("Invalid Telegram chat id: {}", chat_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipient() {
        assert_eq!(parse_recipient("-1001234567890").unwrap(), Recipient::Id(ChatId(-1001234567890)));
        assert_eq!(
            parse_recipient("@pump_alerts").unwrap(),
            Recipient::ChannelUsername("@pump_alerts".to_string())
        );
        assert!(parse_recipient("not a chat").is_err());
        assert!(parse_recipient("@").is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(TelegramNotifier::new(" ", "123"), Err(Error::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify("<b>hello</b>").await.is_ok());
    }

    #[test]
    fn test_disabled_config_uses_log() {
        let config = TelegramConfig {
            bot_token: "123:abc".into(),
            chat_id: "42".into(),
            enable_notifications: false,
        };
        assert!(notifier_from_config(&config).is_ok());
    }
}
