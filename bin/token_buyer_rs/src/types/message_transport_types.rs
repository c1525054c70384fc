use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    pub telegram_bot_token: String,
    pub telegram_channel_id: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_channel_id", &self.telegram_channel_id)
            .finish()
    }
}
