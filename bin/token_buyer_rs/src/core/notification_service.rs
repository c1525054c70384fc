use teloxide::prelude::*;
use token_buyer_utils::env::{get_env, get_env_parsed};

use crate::types::TelegramConfig;

/// Optional purchase summaries pushed to a Telegram channel. Disabled unless
/// `TELEGRAM_ENABLED=true`; delivery failures are logged, never propagated
/// into the purchase path.
#[derive(Debug, Clone, Default)]
pub struct NotificationService {
    telegram: Option<(TelegramConfig, Bot)>,
}

impl NotificationService {
    pub fn disabled() -> Self {
        Self { telegram: None }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let telegram_enabled: bool = get_env_parsed("TELEGRAM_ENABLED", Some("false"))?;
        if !telegram_enabled {
            return Ok(Self::disabled());
        }

        let telegram_config = TelegramConfig {
            telegram_bot_token: get_env("TELEGRAM_BOT_TOKEN", None)?,
            telegram_channel_id: get_env("TELEGRAM_CHANNEL_ID", None)?,
        };
        let telegram_bot = Bot::new(telegram_config.telegram_bot_token.clone());

        Ok(Self {
            telegram: Some((telegram_config, telegram_bot)),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.telegram.is_some()
    }

    pub async fn send_message(&self, message: String) {
        let Some((telegram_config, telegram_bot)) = &self.telegram else {
            return;
        };

        log::info!("Sending message to telegram bot...");
        if let Err(err) = telegram_bot
            .send_message(telegram_config.telegram_channel_id.clone(), message)
            .await
        {
            log::warn!("[NotificationService] telegram delivery failed: {:?}", err);
        }
    }
}
